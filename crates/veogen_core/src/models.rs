/// Model options offered to the user: identifier plus a short label.
pub const MODEL_OPTIONS: [(&str, &str); 6] = [
    ("veo3", "veo3 - balanced quality and speed"),
    ("veo3-fast", "veo3-fast - fast mode, good for iteration"),
    ("veo3-pro", "veo3-pro - high quality output"),
    ("veo3-frames", "veo3-frames - high quality, supports first-frame upload"),
    ("veo3-fast-frames", "veo3-fast-frames - fast mode plus first-frame upload"),
    ("veo3-pro-frames", "veo3-pro-frames - high quality plus first-frame upload"),
];

/// The preselected model. Fast mode keeps iteration cheap.
pub const DEFAULT_MODEL: &str = "veo3-fast";

pub fn is_known_model(id: &str) -> bool {
    MODEL_OPTIONS.iter().any(|(model, _)| *model == id)
}
