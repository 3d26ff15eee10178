use serde::{Deserialize, Serialize};

pub type Rgb = [u8; 3];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaletteResponse {
    pub palette: Vec<Rgb>,
}

/// Colormind accepts either a fixed colour or `"N"` for a slot it should fill.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ColormindSlot {
    Fixed(Rgb),
    Free(&'static str),
}

impl ColormindSlot {
    pub fn free() -> Self {
        ColormindSlot::Free("N")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColormindRequest {
    pub model: String,
    pub input: Vec<ColormindSlot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColormindResponse {
    #[serde(default)]
    pub result: Vec<Rgb>,
}
