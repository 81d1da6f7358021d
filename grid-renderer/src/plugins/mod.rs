//! Example plugins.

mod bloom;
mod border_glow;
mod lightning;

use std::rc::Rc;

pub use bloom::BloomPlugin;
pub use border_glow::BorderGlowPlugin;
pub use lightning::LightningPlugin;

use crate::GridPlugin;

/// Names accepted by [`builtin`].
pub const BUILTIN_NAMES: [&str; 3] = ["borderGlow", "bloom", "lightning"];

/// Look up an example plugin by name.
#[must_use]
pub fn builtin(name: &str) -> Option<Rc<dyn GridPlugin>> {
    match name {
        "borderGlow" | "glow" => Some(Rc::new(BorderGlowPlugin::default())),
        "bloom" => Some(Rc::new(BloomPlugin::default())),
        "lightning" => Some(Rc::new(LightningPlugin::default())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        for name in BUILTIN_NAMES {
            assert!(builtin(name).is_some(), "{name}");
        }
        assert!(builtin("sparkles").is_none());
    }
}
