//! Page identifiers and routing decisions
//!
//! Pages are a closed set. Everything here is pure: mapping strings, address
//! fragments and shortcut keys to pages, with no DOM access.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{ValidationError, ValidationErrorKind};

/// Content sections of the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Home,
    About,
    Projects,
    Contact,
}

impl Page {
    /// All pages, in navigation order
    pub const ALL: [Page; 4] = [Page::Home, Page::About, Page::Projects, Page::Contact];

    /// Identifier used in the page-target attribute and the address fragment
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::About => "about",
            Page::Projects => "projects",
            Page::Contact => "contact",
        }
    }

    /// Address fragment for this page, including the leading `#`
    pub fn fragment(&self) -> String {
        format!("#{}", self.as_str())
    }

    /// Whether landing on this page replays the skill bars
    pub fn animates_skills(&self) -> bool {
        matches!(self, Page::About)
    }

    /// Page bound to a numeric shortcut key (`1` through `4`)
    pub fn from_shortcut(key: &str) -> Option<Page> {
        match key {
            "1" => Some(Page::Home),
            "2" => Some(Page::About),
            "3" => Some(Page::Projects),
            "4" => Some(Page::Contact),
            _ => None,
        }
    }
}

impl FromStr for Page {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Page::Home),
            "about" => Ok(Page::About),
            "projects" => Ok(Page::Projects),
            "contact" => Ok(Page::Contact),
            _ => Err(ValidationError::with_context(
                ValidationErrorKind::UnknownPage,
                "page",
                format!("Unknown page id: {}", s),
            )),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip the leading `#` from an address fragment
pub fn fragment_id(fragment: &str) -> &str {
    fragment.strip_prefix('#').unwrap_or(fragment)
}

/// Id requested by a fragment, `home` when the fragment is empty
///
/// Unknown ids pass through unchanged; callers decide how to degrade.
pub fn requested_id(fragment: &str) -> &str {
    match fragment_id(fragment) {
        "" => Page::Home.as_str(),
        id => id,
    }
}

/// Page shown on first load: the fragment's page, else home
pub fn resolve_initial(fragment: &str) -> Page {
    requested_id(fragment).parse().unwrap_or(Page::Home)
}
