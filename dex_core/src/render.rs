//! Pure mapping from a catalog record to the text written on screen.

use dex_proto::CreatureRecord;
use serde::Serialize;

use crate::config::ViewerConfig;
use crate::presentation::PresentationSurface;

/// Image reference with its ordered fallbacks.
///
/// The presentation layer calls [`ImageSource::on_load_error`] when the
/// current asset fails to load; the source then moves on to the next
/// candidate, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSource {
    candidates: Vec<String>,
    position: usize,
}

impl ImageSource {
    pub fn new<I>(primary: impl Into<String>, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut candidates = vec![primary.into()];
        candidates.extend(
            fallbacks
                .into_iter()
                .flatten()
                .filter(|url| !url.is_empty()),
        );
        Self {
            candidates,
            position: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.candidates[self.position]
    }

    pub fn is_fallback(&self) -> bool {
        self.position > 0
    }

    pub fn remaining_fallbacks(&self) -> usize {
        self.candidates.len() - self.position - 1
    }

    /// Advance past a failed asset. Returns the new source, or `None` when
    /// every candidate has been tried.
    pub fn on_load_error(&mut self) -> Option<&str> {
        if self.position + 1 < self.candidates.len() {
            self.position += 1;
            Some(self.current())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayFields {
    pub image: ImageSource,
    pub alt: String,
    pub name: String,
    pub category: String,
    pub height: String,
    pub weight: String,
    pub identifier: String,
    pub primary_trait: String,
}

impl DisplayFields {
    /// Write every field to the surface and restart its transition.
    pub fn apply_to<S: PresentationSurface + ?Sized>(&self, surface: &mut S) {
        surface.show_image(&self.image, &self.alt);
        surface.show_name(&self.name);
        surface.show_category(&self.category);
        surface.show_height(&self.height);
        surface.show_weight(&self.weight);
        surface.show_identifier(&self.identifier);
        surface.show_primary_trait(&self.primary_trait);
        surface.restart_transition();
    }

    pub fn summary(&self) -> String {
        format!(
            "{} {} | {} | {} | {} | {}",
            self.identifier, self.name, self.category, self.height, self.weight, self.primary_trait
        )
    }
}

pub fn render_record(record: &CreatureRecord, config: &ViewerConfig) -> DisplayFields {
    let image = ImageSource::new(
        primary_image_url(&config.sprite_base_url, record.id),
        [
            record.official_artwork().map(str::to_string),
            record.front_default().map(str::to_string),
        ],
    );
    let traits = record.trait_names();

    DisplayFields {
        image,
        alt: record.name.clone(),
        name: record.name.clone(),
        category: format_categories(record.category_names()),
        height: format_tenths(record.height, &config.length_unit),
        weight: format_tenths(record.weight, &config.mass_unit),
        identifier: format_identifier(record.id),
        primary_trait: format_primary_trait(traits.first().copied(), &config.unknown_trait_text),
    }
}

/// Animated action-pose asset, addressed by identifier.
pub fn primary_image_url(sprite_base_url: &str, id: u32) -> String {
    format!("{}/{}.gif", sprite_base_url.trim_end_matches('/'), id)
}

pub fn format_categories<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().collect::<Vec<_>>().join(", ")
}

/// Tenths of a unit to one decimal place, computed on integers so there is
/// no float rounding.
pub fn format_tenths(tenths: u32, unit: &str) -> String {
    format!("{}.{} {}", tenths / 10, tenths % 10, unit)
}

pub fn format_identifier(id: u32) -> String {
    format!("#{:03}", id)
}

pub fn format_primary_trait(first: Option<&str>, placeholder: &str) -> String {
    match first {
        Some(name) => name.replace('-', " "),
        None => placeholder.to_string(),
    }
}
