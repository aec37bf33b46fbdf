/// Errors raised while mapping, generating or configuring the world.
///
/// None of these are fatal to the frame loop: callers recover by skipping the
/// coordinate or committing an empty Highway cell.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error("coordinate ({x}, {y}) offset by ({dx}, {dy}) leaves the addressable grid")]
    InvalidCoordinate { x: i32, y: i32, dx: i32, dy: i32 },
    #[error("generation failed: {0}")]
    GenerationFailure(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}
