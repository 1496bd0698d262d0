//! Catalog records and the palette of node templates built from them.
//!
//! Each catalog section carries a revision counter that changes whenever the
//! section's contents are replaced or edited. The propagation layer watches
//! these revisions to decide when a palette section must be rebuilt.

pub mod records;
pub mod templates;

pub use records::{CatalogElement, CatalogSkill, SavedColor};
pub use templates::NodeTemplate;

use crate::error::ServiceError;
use crate::services::CatalogSource;
use crate::session::SessionContext;
use std::fmt;
use tracing::debug;

/// A group of templates in the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteSection {
    Elements,
    Skills,
    Colors,
    TimeEvents,
}

impl PaletteSection {
    pub const ALL: [PaletteSection; 4] = [
        PaletteSection::Elements,
        PaletteSection::Skills,
        PaletteSection::Colors,
        PaletteSection::TimeEvents,
    ];

    /// Sections whose contents come from the catalog service.
    pub const CATALOG_BACKED: [PaletteSection; 3] = [
        PaletteSection::Elements,
        PaletteSection::Skills,
        PaletteSection::Colors,
    ];
}

impl fmt::Display for PaletteSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaletteSection::Elements => "elements",
            PaletteSection::Skills => "skills",
            PaletteSection::Colors => "colors",
            PaletteSection::TimeEvents => "time events",
        };
        f.write_str(name)
    }
}

/// In-memory copy of the catalog lists for one editor session.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    elements: Vec<CatalogElement>,
    skills: Vec<CatalogSkill>,
    saved_colors: Vec<SavedColor>,
    revisions: [u64; 3],
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches every section. Saved colors are only requested for a signed-in user.
    pub async fn load(
        source: &dyn CatalogSource,
        ctx: &SessionContext,
    ) -> Result<Self, ServiceError> {
        let mut catalog = Catalog::new();
        catalog.set_elements(source.elements().await?);
        catalog.set_skills(source.skills().await?);
        if let Some(user_id) = ctx.user_id {
            catalog.set_saved_colors(source.saved_colors(user_id).await?);
        }
        Ok(catalog)
    }

    pub fn elements(&self) -> &[CatalogElement] {
        &self.elements
    }

    pub fn skills(&self) -> &[CatalogSkill] {
        &self.skills
    }

    pub fn saved_colors(&self) -> &[SavedColor] {
        &self.saved_colors
    }

    pub fn set_elements(&mut self, elements: Vec<CatalogElement>) {
        self.elements = elements;
        self.bump(PaletteSection::Elements);
    }

    pub fn set_skills(&mut self, skills: Vec<CatalogSkill>) {
        self.skills = skills;
        self.bump(PaletteSection::Skills);
    }

    pub fn set_saved_colors(&mut self, colors: Vec<SavedColor>) {
        self.saved_colors = colors;
        self.bump(PaletteSection::Colors);
    }

    pub fn push_saved_color(&mut self, color: SavedColor) {
        self.saved_colors.push(color);
        self.bump(PaletteSection::Colors);
    }

    /// Removes a saved color by id. The revision only changes if something was removed.
    pub fn remove_saved_color(&mut self, id: i64) -> Option<SavedColor> {
        let idx = self.saved_colors.iter().position(|c| c.id == id)?;
        let removed = self.saved_colors.remove(idx);
        self.bump(PaletteSection::Colors);
        Some(removed)
    }

    /// Current revision of a section. Static sections always report 0.
    pub fn revision(&self, section: PaletteSection) -> u64 {
        match Self::slot(section) {
            Some(slot) => self.revisions[slot],
            None => 0,
        }
    }

    /// Builds the templates a section currently offers.
    pub fn templates(&self, section: PaletteSection) -> Vec<NodeTemplate> {
        match section {
            PaletteSection::Elements => self.elements.iter().map(NodeTemplate::from).collect(),
            PaletteSection::Skills => self.skills.iter().map(NodeTemplate::from).collect(),
            PaletteSection::Colors => std::iter::once(templates::color_template())
                .chain(
                    self.saved_colors
                        .iter()
                        .filter_map(templates::saved_color_template),
                )
                .collect(),
            PaletteSection::TimeEvents => templates::time_templates(),
        }
    }

    fn bump(&mut self, section: PaletteSection) {
        if let Some(slot) = Self::slot(section) {
            self.revisions[slot] += 1;
            debug!(%section, revision = self.revisions[slot], "Catalog section changed");
        }
    }

    fn slot(section: PaletteSection) -> Option<usize> {
        match section {
            PaletteSection::Elements => Some(0),
            PaletteSection::Skills => Some(1),
            PaletteSection::Colors => Some(2),
            PaletteSection::TimeEvents => None,
        }
    }
}

/// The template lists shown to the user. A section is `None` until initialized.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    elements: Option<Vec<NodeTemplate>>,
    skills: Option<Vec<NodeTemplate>>,
    colors: Option<Vec<NodeTemplate>>,
    time_events: Option<Vec<NodeTemplate>>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every section from the catalog.
    pub fn initialize(&mut self, catalog: &Catalog) {
        for section in PaletteSection::ALL {
            *self.slot_mut(section) = Some(catalog.templates(section));
        }
    }

    pub fn is_initialized(&self, section: PaletteSection) -> bool {
        self.section(section).is_some()
    }

    pub fn section(&self, section: PaletteSection) -> Option<&[NodeTemplate]> {
        match section {
            PaletteSection::Elements => self.elements.as_deref(),
            PaletteSection::Skills => self.skills.as_deref(),
            PaletteSection::Colors => self.colors.as_deref(),
            PaletteSection::TimeEvents => self.time_events.as_deref(),
        }
    }

    /// Rebuilds one section. Returns false, changing nothing, if it was never initialized.
    pub fn refresh(&mut self, section: PaletteSection, catalog: &Catalog) -> bool {
        let slot = self.slot_mut(section);
        if slot.is_none() {
            debug!(%section, "Skipping refresh of uninitialized palette section");
            return false;
        }
        *slot = Some(catalog.templates(section));
        debug!(%section, "Palette section refreshed");
        true
    }

    fn slot_mut(&mut self, section: PaletteSection) -> &mut Option<Vec<NodeTemplate>> {
        match section {
            PaletteSection::Elements => &mut self.elements,
            PaletteSection::Skills => &mut self.skills,
            PaletteSection::Colors => &mut self.colors,
            PaletteSection::TimeEvents => &mut self.time_events,
        }
    }
}
