//! Class mapping and the YOLO-style point records written for each tag.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassLabel {
    Personaje,
    Vehiculo,
    Objeto,
    Fondo,
}

impl ClassLabel {
    pub const ALL: [ClassLabel; 4] = [
        ClassLabel::Personaje,
        ClassLabel::Vehiculo,
        ClassLabel::Objeto,
        ClassLabel::Fondo,
    ];

    /// Exact, case-sensitive lookup of a tag name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Personaje" => Some(ClassLabel::Personaje),
            "Vehículo" => Some(ClassLabel::Vehiculo),
            "Objeto" => Some(ClassLabel::Objeto),
            "Fondo" => Some(ClassLabel::Fondo),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClassLabel::Personaje => "Personaje",
            ClassLabel::Vehiculo => "Vehículo",
            ClassLabel::Objeto => "Objeto",
            ClassLabel::Fondo => "Fondo",
        }
    }

    pub fn index(self) -> u32 {
        match self {
            ClassLabel::Personaje => 0,
            ClassLabel::Vehiculo => 1,
            ClassLabel::Objeto => 2,
            ClassLabel::Fondo => 3,
        }
    }
}

/// A point drawn on an image. Coordinates are expected to be normalized to
/// [0,1] by the client. Integers are written back as integers and floats in
/// their shortest round-trip form (`0.10` becomes `0.1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub x: Number,
    pub y: Number,
}

/// One line of a label file: `<class> <x> <y> 0 0`.
///
/// Width and height are always zero since only points are recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRecord {
    pub class: ClassLabel,
    pub x: Number,
    pub y: Number,
}

impl LabelRecord {
    pub fn from_tag(tag: &Tag) -> Option<Self> {
        ClassLabel::from_name(&tag.name).map(|class| Self {
            class,
            x: tag.x.clone(),
            y: tag.y.clone(),
        })
    }
}

impl fmt::Display for LabelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} 0 0", self.class.index(), self.x, self.y)
    }
}
