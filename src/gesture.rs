use std::fmt;

/// The single label type shared by the classifier, stabilizer and control mapper.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Gesture {
    /// No subject, or a subject in a neutral stance.
    Idle,
    Jump,
    Duck,
    /// Hand pinch: the explicit "keep running" signal.
    Run,
}

impl Default for Gesture {
    fn default() -> Self {
        Self::Idle
    }
}

impl Gesture {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Jump => "jump",
            Self::Duck => "duck",
            Self::Run => "run",
        }
    }

    /// BGR colour used when drawing this gesture.
    #[cfg(feature = "gui")]
    pub(crate) fn color(self) -> [u8; 3] {
        match self {
            Self::Jump => [80, 200, 80],
            Self::Duck => [255, 80, 80],
            Self::Run => [0, 180, 255],
            Self::Idle => [180, 180, 180],
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
