use uuid::Uuid;

/// Per-instance prefix for every class, id and attribute the widget injects,
/// so two widgets can annotate the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    /// `<prefix>-<8 hex digits>`
    pub fn generate(prefix: &str) -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self {
            prefix: format!("{prefix}-{}", &simple[..8]),
        }
    }

    /// Use `prefix` verbatim
    pub fn fixed(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    pub fn term_class(&self) -> String {
        format!("{}-term", self.prefix)
    }

    pub fn popup_class(&self) -> String {
        format!("{}-popup", self.prefix)
    }

    pub fn popup_active_class(&self) -> String {
        format!("{}-popup-active", self.prefix)
    }

    pub fn popup_placement_class(&self, placement: &str) -> String {
        format!("{}-popup-{placement}", self.prefix)
    }

    pub fn popup_part_class(&self, part: &str) -> String {
        format!("{}-popup-{part}", self.prefix)
    }

    pub fn popup_id(&self, term_id: &str) -> String {
        format!("{}-popup-{}", self.prefix, sanitize_id(term_id))
    }

    pub fn live_region_class(&self) -> String {
        format!("{}-live", self.prefix)
    }

    pub fn sr_only_class(&self) -> String {
        format!("{}-sr-only", self.prefix)
    }

    pub fn style_id(&self) -> String {
        format!("{}-styles", self.prefix)
    }
}

/// Term ids come from data files; keep them usable inside an element id
fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
