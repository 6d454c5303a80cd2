use serde::{Deserialize, Serialize};

use crate::engine::contract::FrameDescriptor;

/// One corner of a detection box, in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corner {
    pub x: i32,
    pub y: i32,
}

/// Object classes reported by detection engines.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectClass {
    None,
    Person,
    Vehicle,
    NonVehicle,
    Face,
    Head,
    Pet,
    Motorcycle,
    Bicycle,
    Plate,
    Baby,
    Package,
}

impl ObjectClass {
    /// Numeric code as engines report it on the wire.
    pub fn code(&self) -> u32 {
        match self {
            ObjectClass::None => 0,
            ObjectClass::Person => 1,
            ObjectClass::Vehicle => 2,
            ObjectClass::NonVehicle => 3,
            ObjectClass::Face => 4,
            ObjectClass::Head => 5,
            ObjectClass::Pet => 6,
            ObjectClass::Motorcycle => 7,
            ObjectClass::Bicycle => 8,
            ObjectClass::Plate => 9,
            ObjectClass::Baby => 10,
            ObjectClass::Package => 11,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => ObjectClass::None,
            1 => ObjectClass::Person,
            2 => ObjectClass::Vehicle,
            3 => ObjectClass::NonVehicle,
            4 => ObjectClass::Face,
            5 => ObjectClass::Head,
            6 => ObjectClass::Pet,
            7 => ObjectClass::Motorcycle,
            8 => ObjectClass::Bicycle,
            9 => ObjectClass::Plate,
            10 => ObjectClass::Baby,
            11 => ObjectClass::Package,
            _ => return None,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ObjectClass::None => "NONE",
            ObjectClass::Person => "PERSON",
            ObjectClass::Vehicle => "VEHICLE",
            ObjectClass::NonVehicle => "NON_VEHICLE",
            ObjectClass::Face => "FACE",
            ObjectClass::Head => "HEAD",
            ObjectClass::Pet => "PET",
            ObjectClass::Motorcycle => "MOTORCYCLE",
            ObjectClass::Bicycle => "BICYCLE",
            ObjectClass::Plate => "PLATE",
            ObjectClass::Baby => "BABY",
            ObjectClass::Package => "PACKAGE",
        }
    }
}

/// One detected object within a frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Detection {
    pub top_left: Corner,
    pub bottom_right: Corner,
    pub object_id: u32,
    pub frame_id: u64,
    /// Confidence, 0..=100.
    pub score: u32,
    pub class: ObjectClass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineStatus {
    Completed,
    Failed,
}

/// Everything the engine reports for one completed frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameReport {
    pub descriptor: FrameDescriptor,
    pub status: EngineStatus,
    pub detections: Vec<Detection>,
}
