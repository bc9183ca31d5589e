//! Font database shared by every canvas surface.
//!
//! Scanning system fonts is slow, so the database is built once at startup and
//! each request clones it into its own `FontSystem`.

use std::path::Path;
use std::sync::Arc;

use cosmic_text::{fontdb, FontSystem};
use tracing::{info, warn};

use crate::render::canvas::CanvasSurface;

const FONT_LOCALE: &str = "ko-KR";

#[derive(Clone)]
pub struct FontLibrary {
    db: Arc<fontdb::Database>,
}

impl FontLibrary {
    /// Builds the database from system fonts and/or a directory of font files.
    pub fn load(load_system_fonts: bool, font_dir: Option<&Path>) -> Self {
        let mut db = fontdb::Database::new();

        if load_system_fonts {
            db.load_system_fonts();
        }

        if let Some(dir) = font_dir {
            if dir.is_dir() {
                db.load_fonts_dir(dir);
            } else {
                warn!(path = %dir.display(), "FONT_DIR is not a directory; skipping");
            }
        }

        info!(faces = db.len(), "Font database loaded");
        Self { db: Arc::new(db) }
    }

    /// A library with no faces. Surfaces built from it are never attached.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
        }
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// A fresh surface with its own font system over a copy of the database.
    pub fn surface(&self) -> CanvasSurface {
        let font_system =
            FontSystem::new_with_locale_and_db(FONT_LOCALE.to_string(), (*self.db).clone());
        CanvasSurface::new(font_system)
    }
}
