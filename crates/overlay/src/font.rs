//! Font resolution: logical font name to a parsed `ab_glyph` font.
//!
//! The catalog scans conventional system font directories once at
//! construction and records candidate files. Parsing is deferred to
//! [`FontCatalog::resolve`] and cached, so constructing a catalog on a
//! machine with hundreds of fonts stays cheap.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use parking_lot::Mutex;
use tracing::{debug, warn};

use cap_common::error::RenderError;

/// How deep the directory scan recurses below each font root.
const MAX_SCAN_DEPTH: u32 = 3;

/// A candidate font file discovered during the directory scan.
#[derive(Clone, Debug)]
struct FontFile {
    /// Lowercased file stem, used for name matching.
    stem: String,
    path: PathBuf,
}

/// Maps logical font names to parsed fonts, with a default-font fallback.
pub struct FontCatalog {
    /// Discovered font files, in scan order.
    files: Vec<FontFile>,
    /// Fonts registered directly (tests, embedders), checked before files.
    registered: Vec<(String, FontArc)>,
    /// Parse cache: lowercased requested name -> parsed font.
    cache: Mutex<HashMap<String, FontArc>>,
    /// The fallback font, parsed lazily from the first usable file.
    default_font: Mutex<Option<FontArc>>,
}

impl FontCatalog {
    /// Build a catalog from the conventional system font directories.
    pub fn system() -> Self {
        let mut files = Vec::new();
        for root in system_font_roots() {
            scan_dir(&root, 0, &mut files);
        }
        debug!(count = files.len(), "Font scan complete");
        Self {
            files,
            registered: Vec::new(),
            cache: Mutex::new(HashMap::new()),
            default_font: Mutex::new(None),
        }
    }

    /// An empty catalog. Useful as a base for [`Self::register`].
    pub fn empty() -> Self {
        Self {
            files: Vec::new(),
            registered: Vec::new(),
            cache: Mutex::new(HashMap::new()),
            default_font: Mutex::new(None),
        }
    }

    /// A catalog whose only font is `font`, which is also the default.
    pub fn from_font(name: impl Into<String>, font: FontArc) -> Self {
        let mut catalog = Self::empty();
        catalog.register(name, font);
        catalog
    }

    /// Register a parsed font under a logical name. The first registered
    /// font becomes the default if no file-based default exists.
    pub fn register(&mut self, name: impl Into<String>, font: FontArc) {
        self.registered.push((name.into().to_lowercase(), font));
    }

    /// Parse font bytes and register them under a logical name.
    pub fn register_bytes(
        &mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<(), RenderError> {
        let name = name.into();
        let font = FontArc::try_from_vec(bytes).map_err(|e| RenderError::FontParse {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        self.register(name, font);
        Ok(())
    }

    /// Resolve a logical font name.
    ///
    /// Empty or unresolvable names fall back to the default font; this is
    /// never an error as long as *some* font exists. Returns
    /// [`RenderError::NoFont`] only when the catalog has no usable font at
    /// all.
    pub fn resolve(&self, name: &str) -> Result<FontArc, RenderError> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return self.default_font(name);
        }

        if let Some(font) = self.cache.lock().get(&wanted) {
            return Ok(font.clone());
        }

        for (reg_name, font) in &self.registered {
            if *reg_name == wanted {
                self.cache.lock().insert(wanted, font.clone());
                return Ok(font.clone());
            }
        }

        // Exact stem match first (with and without whitespace, so
        // "DejaVu Sans" finds "DejaVuSans.ttf"), then stem-as-prefix of
        // the request, which tolerates style suffixes in the name.
        let squashed: String = wanted.chars().filter(|c| !c.is_whitespace()).collect();
        let found = self
            .files
            .iter()
            .find(|f| f.stem == wanted || f.stem == squashed)
            .or_else(|| self.files.iter().find(|f| squashed.starts_with(&f.stem)));

        if let Some(file) = found {
            match parse_font_file(&file.path) {
                Ok(font) => {
                    self.cache.lock().insert(wanted, font.clone());
                    return Ok(font);
                }
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "Font file unusable, falling back");
                }
            }
        } else {
            debug!(requested = name, "Font name not found, falling back to default");
        }

        self.default_font(name)
    }

    /// The fallback font, parsed from the first usable candidate.
    pub fn default_font(&self, requested: &str) -> Result<FontArc, RenderError> {
        if let Some(font) = self.default_font.lock().clone() {
            return Ok(font);
        }

        if let Some((_, font)) = self.registered.first() {
            *self.default_font.lock() = Some(font.clone());
            return Ok(font.clone());
        }

        for file in &self.files {
            match parse_font_file(&file.path) {
                Ok(font) => {
                    debug!(path = %file.path.display(), "Selected default font");
                    *self.default_font.lock() = Some(font.clone());
                    return Ok(font);
                }
                Err(e) => {
                    debug!(path = %file.path.display(), error = %e, "Skipping unusable font file");
                }
            }
        }

        Err(RenderError::NoFont {
            requested: requested.to_string(),
        })
    }

    /// Whether the catalog can produce any font at all.
    pub fn has_any_font(&self) -> bool {
        self.default_font("").is_ok()
    }
}

impl std::fmt::Debug for FontCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontCatalog")
            .field("files", &self.files.len())
            .field("registered", &self.registered.len())
            .finish()
    }
}

fn parse_font_file(path: &Path) -> Result<FontArc, RenderError> {
    let bytes = fs::read(path).map_err(|e| RenderError::FontParse {
        name: path.display().to_string(),
        reason: e.to_string(),
    })?;
    FontArc::try_from_vec(bytes).map_err(|e| RenderError::FontParse {
        name: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn system_font_roots() -> Vec<PathBuf> {
    let mut roots = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("C:\\Windows\\Fonts"),
    ];
    if let Ok(home) = std::env::var("HOME") {
        roots.push(PathBuf::from(home).join(".fonts"));
    }
    roots
}

fn scan_dir(dir: &Path, depth: u32, out: &mut Vec<FontFile>) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_dir(&path, depth + 1, out);
            continue;
        }
        let is_font = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_lowercase().as_str(), "ttf" | "otf"))
            .unwrap_or(false);
        if !is_font {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        out.push(FontFile {
            stem: stem.to_lowercase(),
            path,
        });
    }
}
