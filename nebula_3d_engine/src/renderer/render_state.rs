/// Fixed-function render state bits carried by shaders and materials

use bitflags::bitflags;

bitflags! {
    /// Render state bitmask
    ///
    /// The low bits are boolean states. Bits 40..48 hold the 8-bit alpha
    /// reference used by alpha testing (see [`RenderState::with_alpha_ref`]).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderState: u64 {
        const CULL_CW        = 1 << 0;
        const CULL_CCW       = 1 << 1;
        const DEPTH_TEST     = 1 << 2;
        const DEPTH_WRITE    = 1 << 3;
        const ALPHA_BLEND    = 1 << 4;
        const ADDITIVE_BLEND = 1 << 5;
        const ALPHA_TEST     = 1 << 6;
        const WIREFRAME      = 1 << 7;
        const ALPHA_REF_MASK = 0xff << 40;
    }
}

impl RenderState {
    pub const ALPHA_REF_SHIFT: u32 = 40;

    /// Parse a render state name as written in shader documents
    pub fn from_state_name(name: &str) -> Option<Self> {
        match name {
            "cull_cw" => Some(Self::CULL_CW),
            "cull_ccw" => Some(Self::CULL_CCW),
            "depth_test" => Some(Self::DEPTH_TEST),
            "depth_write" => Some(Self::DEPTH_WRITE),
            "alpha_blend" => Some(Self::ALPHA_BLEND),
            "additive_blend" => Some(Self::ADDITIVE_BLEND),
            "alpha_test" => Some(Self::ALPHA_TEST),
            "wireframe" => Some(Self::WIREFRAME),
            _ => None,
        }
    }

    /// Replace the alpha reference sub-field with `round(alpha_ref * 255)`
    ///
    /// `alpha_ref` is clamped to `[0, 1]`.
    pub fn with_alpha_ref(self, alpha_ref: f32) -> Self {
        let value = (alpha_ref.clamp(0.0, 1.0) * 255.0).round() as u64;
        let bits = (self.bits() & !Self::ALPHA_REF_MASK.bits()) | (value << Self::ALPHA_REF_SHIFT);
        Self::from_bits_retain(bits)
    }

    /// The 8-bit alpha reference sub-field
    pub fn alpha_ref(self) -> u8 {
        ((self.bits() & Self::ALPHA_REF_MASK.bits()) >> Self::ALPHA_REF_SHIFT) as u8
    }
}

#[cfg(test)]
#[path = "render_state_tests.rs"]
mod tests;
