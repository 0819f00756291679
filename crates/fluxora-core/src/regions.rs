//! Display regions and lookup that tolerates missing regions.

use std::collections::BTreeMap;

use crate::presenter::{AccountPanel, ButtonView, NetworkPanel, StatusLine};

/// Identified slots on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionId {
    ConnectButton,
    Status,
    AccountInfo,
    NetworkInfo,
    QuestList,
    QuestForm,
}

impl RegionId {
    /// All regions, in page order.
    pub const ALL: [RegionId; 6] = [
        RegionId::ConnectButton,
        RegionId::Status,
        RegionId::AccountInfo,
        RegionId::NetworkInfo,
        RegionId::QuestList,
        RegionId::QuestForm,
    ];

    /// Returns the element id used in the markup.
    pub fn element_id(&self) -> &'static str {
        match self {
            RegionId::ConnectButton => "connect-button",
            RegionId::Status => "status",
            RegionId::AccountInfo => "account-info",
            RegionId::NetworkInfo => "network-info",
            RegionId::QuestList => "quest-list",
            RegionId::QuestForm => "quest-form",
        }
    }

    /// Looks a region up by its element id.
    pub fn from_element_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|region| region.element_id() == id)
    }
}

/// What a region currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RegionContent {
    #[default]
    Empty,
    Button(ButtonView),
    Status(StatusLine),
    Account(AccountPanel),
    Network(NetworkPanel),
}

/// Lookup of display regions by identifier.
///
/// Returns `None` for regions that are not mounted; callers skip them.
pub trait ElementAccessor {
    fn element(&mut self, id: RegionId) -> Option<&mut RegionContent>;
}

/// In-memory set of mounted regions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMap {
    regions: BTreeMap<RegionId, RegionContent>,
}

impl RegionMap {
    /// Creates a map with no regions mounted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map with every region mounted.
    pub fn all() -> Self {
        Self::with_regions(RegionId::ALL)
    }

    /// Creates a map with the given regions mounted and empty.
    pub fn with_regions(ids: impl IntoIterator<Item = RegionId>) -> Self {
        Self {
            regions: ids
                .into_iter()
                .map(|id| (id, RegionContent::Empty))
                .collect(),
        }
    }

    /// Mounts a region if it is not already present.
    pub fn mount(&mut self, id: RegionId) {
        self.regions.entry(id).or_default();
    }

    /// Removes a region and returns what it showed.
    pub fn unmount(&mut self, id: RegionId) -> Option<RegionContent> {
        self.regions.remove(&id)
    }

    pub fn is_mounted(&self, id: RegionId) -> bool {
        self.regions.contains_key(&id)
    }

    /// Returns a region's content if mounted.
    pub fn get(&self, id: RegionId) -> Option<&RegionContent> {
        self.regions.get(&id)
    }
}

impl ElementAccessor for RegionMap {
    fn element(&mut self, id: RegionId) -> Option<&mut RegionContent> {
        self.regions.get_mut(&id)
    }
}
