// # Template Engine Implementations
//
// Local implementations of the TemplateEngine trait. The real Domain Connect
// engine is an external collaborator; these cover running a sync without it.

pub mod overlay;
pub mod passthrough;

pub use overlay::OverlayTemplate;
pub use passthrough::PassthroughTemplate;
