//! Fixed-width record layouts.
//!
//! A layout is an ordered list of field specs, some of them repeated in
//! blocks. Compiling a layout assigns every field its offset and checks the
//! total width once; records are then filled by field name instead of by
//! position.

use std::collections::HashMap;
use std::fmt;

use crate::core::ConvertError;

/// Fill class of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Numeric field, zero-filled when unused.
    Numeric,
    /// Alphanumeric field, space-filled when unused.
    Alpha,
    /// Constant mandated by the format, always written verbatim.
    Fixed(&'static str),
}

/// One field of a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub width: usize,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn numeric(name: &'static str, width: usize) -> Self {
        Self {
            name,
            width,
            kind: FieldKind::Numeric,
        }
    }

    pub const fn alpha(name: &'static str, width: usize) -> Self {
        Self {
            name,
            width,
            kind: FieldKind::Alpha,
        }
    }

    pub const fn fixed(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            width: value.len(),
            kind: FieldKind::Fixed(value),
        }
    }

    /// Content of the field when nothing is written to it.
    pub fn filler(&self) -> String {
        match self.kind {
            FieldKind::Numeric => "0".repeat(self.width),
            FieldKind::Alpha => " ".repeat(self.width),
            FieldKind::Fixed(value) => value.to_string(),
        }
    }
}

/// A single field or a block of fields repeated `n` times.
#[derive(Debug, Clone, Copy)]
pub enum Segment {
    Field(FieldSpec),
    Repeat(usize, &'static [FieldSpec]),
}

/// Static description of a record type.
#[derive(Debug, Clone, Copy)]
pub struct LayoutSpec {
    /// Record name used in diagnostics.
    pub name: &'static str,
    /// Total width the format mandates.
    pub width: usize,
    pub segments: &'static [Segment],
}

impl LayoutSpec {
    /// Sum of all field widths, repetitions included.
    pub fn declared_width(&self) -> usize {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Field(f) => f.width,
                Segment::Repeat(n, fields) => n * fields.iter().map(|f| f.width).sum::<usize>(),
            })
            .sum()
    }
}

/// A field with its position inside the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedField {
    pub name: &'static str,
    /// Repetition index, 0 for fields outside repeated blocks.
    pub slot: usize,
    pub offset: usize,
    pub width: usize,
    pub kind: FieldKind,
}

/// A compiled, width-checked layout.
#[derive(Debug, Clone)]
pub struct RecordLayout {
    name: &'static str,
    width: usize,
    fields: Vec<PlacedField>,
    index: HashMap<(&'static str, usize), usize>,
    template: String,
}

impl RecordLayout {
    /// Place every field and verify the layout.
    ///
    /// Fails on empty fields or repeated blocks, non-ASCII constants,
    /// duplicate field names, or a total width that differs from the
    /// declared record width.
    pub fn compile(spec: &LayoutSpec) -> Result<Self, ConvertError> {
        let mut fields = Vec::new();
        let mut offset = 0;

        let mut place = |f: &FieldSpec, slot: usize| -> Result<(), ConvertError> {
            if f.width == 0 {
                return Err(ConvertError::Layout(format!(
                    "{}: field {} has zero width",
                    spec.name, f.name
                )));
            }
            if let FieldKind::Fixed(value) = f.kind {
                if !value.is_ascii() {
                    return Err(ConvertError::Layout(format!(
                        "{}: constant of {} is not ASCII",
                        spec.name, f.name
                    )));
                }
            }
            fields.push(PlacedField {
                name: f.name,
                slot,
                offset,
                width: f.width,
                kind: f.kind,
            });
            offset += f.width;
            Ok(())
        };

        for segment in spec.segments {
            match segment {
                Segment::Field(f) => place(f, 0)?,
                Segment::Repeat(n, block) => {
                    if *n == 0 || block.is_empty() {
                        return Err(ConvertError::Layout(format!(
                            "{}: empty repeated block",
                            spec.name
                        )));
                    }
                    for slot in 0..*n {
                        for f in *block {
                            place(f, slot)?;
                        }
                    }
                }
            }
        }

        if offset != spec.width {
            return Err(ConvertError::Layout(format!(
                "{}: fields add up to {} characters, record width is {}",
                spec.name, offset, spec.width
            )));
        }

        let mut index = HashMap::with_capacity(fields.len());
        for (i, f) in fields.iter().enumerate() {
            if index.insert((f.name, f.slot), i).is_some() {
                return Err(ConvertError::Layout(format!(
                    "{}: duplicate field {}[{}]",
                    spec.name, f.name, f.slot
                )));
            }
        }

        let mut template = String::with_capacity(spec.width);
        for f in &fields {
            let filler = match f.kind {
                FieldKind::Numeric => "0".repeat(f.width),
                FieldKind::Alpha => " ".repeat(f.width),
                FieldKind::Fixed(value) => value.to_string(),
            };
            template.push_str(&filler);
        }

        Ok(Self {
            name: spec.name,
            width: spec.width,
            fields,
            index,
            template,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn fields(&self) -> &[PlacedField] {
        &self.fields
    }

    pub fn field(&self, name: &str, slot: usize) -> Option<&PlacedField> {
        self.index.get(&(name, slot)).map(|&i| &self.fields[i])
    }

    /// Read a field back out of a rendered record.
    pub fn extract<'r>(&self, record: &'r str, name: &str, slot: usize) -> Option<&'r str> {
        let f = self.field(name, slot)?;
        record.get(f.offset..f.offset + f.width)
    }

    /// A record with every field at its filler value.
    pub fn new_record(&self) -> Record<'_> {
        Record {
            layout: self,
            buf: self.template.clone(),
        }
    }
}

/// A record being filled.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    layout: &'a RecordLayout,
    buf: String,
}

impl Record<'_> {
    /// Write `value` into a non-repeated field.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConvertError> {
        self.set_at(name, 0, value)
    }

    /// Write `value` into the `slot`-th repetition of a field.
    ///
    /// The value must already be packed to the exact field width.
    pub fn set_at(&mut self, name: &str, slot: usize, value: &str) -> Result<(), ConvertError> {
        let layout = self.layout;
        let field = layout.field(name, slot).ok_or_else(|| {
            ConvertError::Layout(format!("{}: no field {name}[{slot}]", layout.name))
        })?;
        if let FieldKind::Fixed(_) = field.kind {
            return Err(ConvertError::Layout(format!(
                "{}: {name} is a constant field",
                layout.name
            )));
        }
        if !value.is_ascii() || value.len() != field.width {
            return Err(ConvertError::Encoding(format!(
                "{}: {name}[{slot}] needs {} ASCII characters, got '{value}'",
                layout.name, field.width
            )));
        }
        self.buf
            .replace_range(field.offset..field.offset + field.width, value);
        Ok(())
    }

    /// Current content of a field.
    pub fn get(&self, name: &str, slot: usize) -> Option<&str> {
        self.layout
            .field(name, slot)
            .map(|f| &self.buf[f.offset..f.offset + f.width])
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}
