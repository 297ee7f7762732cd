//! Capture step definitions
//!
//! The five reference photos, in the order they are taken. Slot `i` of
//! the photo set always holds the photo for `CAPTURE_STEPS[i]`.

use serde::Serialize;

use crate::photos::{Angle, PHOTO_SLOT_COUNT};

/// Outline drawn over the camera preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayShape {
    Front,
    Top,
    SideLeft,
    SideRight,
    Back,
}

/// Static definition of one capture target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureStep {
    /// Target id ("front", "crown", ...)
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// On-screen instruction
    pub instruction: &'static str,
    /// Spoken before the guided countdown
    pub voice_instruction: &'static str,
    pub overlay: OverlayShape,
    /// Angle this photo is archived under
    pub angle: Angle,
}

pub const CAPTURE_STEPS: [CaptureStep; PHOTO_SLOT_COUNT] = [
    CaptureStep {
        id: "front",
        title: "Ön Profil",
        description: "Yüzünüzü ve saç çizginizi çerçeveye yerleştirin",
        instruction: "Doğrudan kameraya bakın. Yüzünüz tamamen görünür olmalı.",
        voice_instruction: "Lütfen kameraya doğrudan bakın. Yüzünüz tamamen görünür olmalı. 3, 2, 1, çekiyorum.",
        overlay: OverlayShape::Front,
        angle: Angle::Front,
    },
    CaptureStep {
        id: "crown",
        title: "Tepe Bölgesi",
        description: "Başınızın üst kısmını gösterin",
        instruction: "Başınızı hafifçe öne eğin veya kamerayı yukarı tutun.",
        voice_instruction: "Şimdi başınızı hafifçe öne eğin. Tepe bölgenizi gösterin. 3, 2, 1, çekiyorum.",
        overlay: OverlayShape::Top,
        angle: Angle::Top,
    },
    CaptureStep {
        id: "left",
        title: "Sol Profil",
        description: "Sol tarafınızı gösterin",
        instruction: "Başınızı sağa çevirin, sol profiliniz görünsün.",
        voice_instruction: "Şimdi başınızı sağa çevirin. Sol profiliniz görünmeli. 3, 2, 1, çekiyorum.",
        overlay: OverlayShape::SideLeft,
        angle: Angle::Left,
    },
    CaptureStep {
        id: "right",
        title: "Sağ Profil",
        description: "Sağ tarafınızı gösterin",
        instruction: "Başınızı sola çevirin, sağ profiliniz görünsün.",
        voice_instruction: "Şimdi başınızı sola çevirin. Sağ profiliniz görünmeli. 3, 2, 1, çekiyorum.",
        overlay: OverlayShape::SideRight,
        angle: Angle::Right,
    },
    CaptureStep {
        id: "donor",
        title: "Ense (Donör Bölge)",
        description: "Arka saç çizgisi bölgesi",
        instruction: "Birinden yardım alabilir veya ayna kullanabilirsiniz.",
        voice_instruction: "Son fotoğraf. Lütfen ense bölgenizi gösterin. Ayna kullanabilir veya yardım alabilirsiniz. 3, 2, 1, çekiyorum.",
        overlay: OverlayShape::Back,
        angle: Angle::Back,
    },
];

pub fn step(index: usize) -> Option<&'static CaptureStep> {
    CAPTURE_STEPS.get(index)
}

/// Index of the step with target id `id`
pub fn index_of(id: &str) -> Option<usize> {
    CAPTURE_STEPS.iter().position(|s| s.id == id)
}

/// "Adım 2 / 5"
pub fn step_label(index: usize) -> String {
    format!("Adım {} / {}", index + 1, CAPTURE_STEPS.len())
}
