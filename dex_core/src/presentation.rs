use serde::Serialize;

use crate::render::ImageSource;

/// Writable sinks for a rendered catalog entry.
///
/// Implemented by whatever hosts the viewer (terminal UI, headless printer,
/// tests). Every sink accepts plain text; the image sink also receives the
/// fallback chain so the host can react to load failures.
pub trait PresentationSurface: Send + 'static {
    fn show_image(&mut self, image: &ImageSource, alt: &str);
    fn show_name(&mut self, text: &str);
    fn show_category(&mut self, text: &str);
    fn show_height(&mut self, text: &str);
    fn show_weight(&mut self, text: &str);
    fn show_identifier(&mut self, text: &str);
    fn show_primary_trait(&mut self, text: &str);

    /// Restart the float/glow transition after a successful render.
    fn restart_transition(&mut self) {}
}

/// Surface that just remembers the last value written to each sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemorySurface {
    pub image: Option<ImageSource>,
    pub image_alt: String,
    pub name: String,
    pub category: String,
    pub height: String,
    pub weight: String,
    pub identifier: String,
    pub primary_trait: String,
    #[serde(skip)]
    pub transitions: u32,
}

impl MemorySurface {
    pub fn image_src(&self) -> Option<&str> {
        self.image.as_ref().map(ImageSource::current)
    }
}

impl PresentationSurface for MemorySurface {
    fn show_image(&mut self, image: &ImageSource, alt: &str) {
        self.image = Some(image.clone());
        self.image_alt = alt.to_string();
    }

    fn show_name(&mut self, text: &str) {
        self.name = text.to_string();
    }

    fn show_category(&mut self, text: &str) {
        self.category = text.to_string();
    }

    fn show_height(&mut self, text: &str) {
        self.height = text.to_string();
    }

    fn show_weight(&mut self, text: &str) {
        self.weight = text.to_string();
    }

    fn show_identifier(&mut self, text: &str) {
        self.identifier = text.to_string();
    }

    fn show_primary_trait(&mut self, text: &str) {
        self.primary_trait = text.to_string();
    }

    fn restart_transition(&mut self) {
        self.transitions += 1;
    }
}
