//! Flattened search results
//!
//! Four independently paged sections are laid out in a fixed order behind
//! an optional tip row:
//!
//! ```text
//! [tip] assets.. users.. chats.. messages..
//! ```
//!
//! Each section shows at most [`SECTION_LIMIT`] rows until it is expanded.
//! Every positional query is derived from the current list sizes and
//! expansion flags only, so `count`, `get_item` and `header_id` always agree.

/// Rows shown per collapsed section
pub const SECTION_LIMIT: usize = 3;

/// A block of rows in the flattened list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchSection {
    Tip,
    Asset,
    User,
    Chat,
    Message,
}

impl SearchSection {
    /// Layout order after the tip
    const LISTS: [SearchSection; 4] = [Self::Asset, Self::User, Self::Chat, Self::Message];

    /// Adapter view type
    pub fn view_type(self) -> i64 {
        match self {
            Self::Tip => 0,
            Self::Asset => 1,
            Self::User => 2,
            Self::Chat => 3,
            Self::Message => 4,
        }
    }
}

/// The row at a position
#[derive(Debug, PartialEq, Eq)]
pub enum SearchItem<'a, A, U, C, M> {
    Tip,
    Asset(&'a A),
    User(&'a U),
    Chat(&'a C),
    Message(&'a M),
}

#[derive(Debug, Clone, Copy, Default)]
struct Expanded {
    asset: bool,
    user: bool,
    chat: bool,
    message: bool,
}

/// Merged asset, user, chat and message results
#[derive(Debug, Clone)]
pub struct SearchDataPackage<A, U, C, M> {
    assets: Option<Vec<A>>,
    users: Option<Vec<U>>,
    chats: Option<Vec<C>>,
    messages: Option<Vec<M>>,
    show_tip: bool,
    expanded: Expanded,
}

impl<A, U, C, M> Default for SearchDataPackage<A, U, C, M> {
    fn default() -> Self {
        Self {
            assets: None,
            users: None,
            chats: None,
            messages: None,
            show_tip: false,
            expanded: Expanded::default(),
        }
    }
}

impl<A, U, C, M> SearchDataPackage<A, U, C, M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace assets, users and chats for a new query
    ///
    /// Messages arrive separately and are cleared here so results from the
    /// previous query never show. Every section starts collapsed again.
    pub fn set_data(
        &mut self,
        query: &str,
        assets: Option<Vec<A>>,
        users: Option<Vec<U>>,
        chats: Option<Vec<C>>,
    ) {
        self.assets = assets;
        self.users = users;
        self.chats = chats;
        self.messages = None;
        self.expanded = Expanded::default();
        self.show_tip = self.should_tip(query);
    }

    pub fn set_messages(&mut self, messages: Vec<M>) {
        self.messages = Some(messages);
    }

    /// Re-evaluate the tip row for an edited query
    pub fn set_query(&mut self, query: &str) {
        self.show_tip = self.should_tip(query);
    }

    pub fn show_tip(&self) -> bool {
        self.show_tip
    }

    /// Show every row of `section` instead of the first [`SECTION_LIMIT`]
    pub fn set_expanded(&mut self, section: SearchSection, expanded: bool) {
        match section {
            SearchSection::Tip => {}
            SearchSection::Asset => self.expanded.asset = expanded,
            SearchSection::User => self.expanded.user = expanded,
            SearchSection::Chat => self.expanded.chat = expanded,
            SearchSection::Message => self.expanded.message = expanded,
        }
    }

    /// Whether the keyword looks like a phone or Mixin id worth a lookup tip
    ///
    /// Only offered when no user matched.
    pub fn should_tip(&self, keyword: &str) -> bool {
        self.users.as_ref().map_or(true, Vec::is_empty) && is_id_keyword(keyword)
    }

    pub fn asset_show_more(&self) -> bool {
        self.show_more(SearchSection::Asset)
    }

    pub fn user_show_more(&self) -> bool {
        self.show_more(SearchSection::User)
    }

    pub fn chat_show_more(&self) -> bool {
        self.show_more(SearchSection::Chat)
    }

    pub fn message_show_more(&self) -> bool {
        self.show_more(SearchSection::Message)
    }

    /// Whether `section` is truncated and has hidden rows
    pub fn show_more(&self, section: SearchSection) -> bool {
        !self.is_expanded(section) && self.full_len(section) > SECTION_LIMIT
    }

    /// Visible row count of a section
    pub fn visible_len(&self, section: SearchSection) -> usize {
        match section {
            SearchSection::Tip => usize::from(self.show_tip),
            _ if self.is_expanded(section) => self.full_len(section),
            _ => self.full_len(section).min(SECTION_LIMIT),
        }
    }

    pub fn count(&self) -> usize {
        self.visible_len(SearchSection::Tip)
            + SearchSection::LISTS
                .iter()
                .map(|s| self.visible_len(*s))
                .sum::<usize>()
    }

    /// `(start, len)` of the message block
    pub fn message_range(&self) -> (usize, usize) {
        let len = self.visible_len(SearchSection::Message);
        (self.count() - len, len)
    }

    pub fn section_at(&self, position: usize) -> Option<SearchSection> {
        self.locate(position).map(|(section, _)| section)
    }

    pub fn get_item(&self, position: usize) -> Option<SearchItem<'_, A, U, C, M>> {
        let (section, index) = self.locate(position)?;
        let item = match section {
            SearchSection::Tip => SearchItem::Tip,
            SearchSection::Asset => SearchItem::Asset(self.assets.as_ref()?.get(index)?),
            SearchSection::User => SearchItem::User(self.users.as_ref()?.get(index)?),
            SearchSection::Chat => SearchItem::Chat(self.chats.as_ref()?.get(index)?),
            SearchSection::Message => SearchItem::Message(self.messages.as_ref()?.get(index)?),
        };
        Some(item)
    }

    /// Sticky header identity: -1 for the tip, else the section view type
    pub fn header_id(&self, position: usize) -> Option<i64> {
        match self.section_at(position)? {
            SearchSection::Tip => Some(-1),
            section => Some(section.view_type()),
        }
    }

    fn full_len(&self, section: SearchSection) -> usize {
        match section {
            SearchSection::Tip => usize::from(self.show_tip),
            SearchSection::Asset => self.assets.as_ref().map_or(0, Vec::len),
            SearchSection::User => self.users.as_ref().map_or(0, Vec::len),
            SearchSection::Chat => self.chats.as_ref().map_or(0, Vec::len),
            SearchSection::Message => self.messages.as_ref().map_or(0, Vec::len),
        }
    }

    fn is_expanded(&self, section: SearchSection) -> bool {
        match section {
            SearchSection::Tip => true,
            SearchSection::Asset => self.expanded.asset,
            SearchSection::User => self.expanded.user,
            SearchSection::Chat => self.expanded.chat,
            SearchSection::Message => self.expanded.message,
        }
    }

    /// Section and index within it for a flat position
    fn locate(&self, position: usize) -> Option<(SearchSection, usize)> {
        let mut offset = position;
        for section in std::iter::once(SearchSection::Tip).chain(SearchSection::LISTS) {
            let len = self.visible_len(section);
            if offset < len {
                return Some((section, offset));
            }
            offset -= len;
        }
        None
    }
}

/// Keyword of at least 4 chars made of digits and `+`; a `+` prefix must be
/// followed by a plausible E.164 number (7 to 15 digits)
pub fn is_id_keyword(keyword: &str) -> bool {
    if keyword.chars().count() < 4 {
        return false;
    }
    if !keyword.chars().all(|c| c.is_ascii_digit() || c == '+') {
        return false;
    }
    match keyword.strip_prefix('+') {
        Some(number) => {
            number.chars().all(|c| c.is_ascii_digit()) && (7..=15).contains(&number.len())
        }
        None => keyword.chars().all(|c| c.is_ascii_digit()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Package = SearchDataPackage<&'static str, &'static str, &'static str, &'static str>;

    fn filled() -> Package {
        let mut data = Package::new();
        data.set_data(
            "bt",
            Some(vec!["BTC", "BCH", "BSV", "BTT"]),
            Some(vec!["bob"]),
            Some(vec!["bitcoin chat", "beta"]),
        );
        data.set_messages(vec!["m1", "m2", "m3", "m4", "m5"]);
        data
    }

    #[test]
    fn test_sections_truncate_to_limit() {
        let data = filled();

        // 3 assets + 1 user + 2 chats + 3 messages
        assert_eq!(data.count(), 9);
        assert!(data.asset_show_more());
        assert!(!data.user_show_more());
        assert!(!data.chat_show_more());
        assert!(data.message_show_more());
    }

    #[test]
    fn test_get_item_order() {
        let data = filled();

        assert_eq!(data.get_item(0), Some(SearchItem::Asset(&"BTC")));
        assert_eq!(data.get_item(2), Some(SearchItem::Asset(&"BSV")));
        assert_eq!(data.get_item(3), Some(SearchItem::User(&"bob")));
        assert_eq!(data.get_item(5), Some(SearchItem::Chat(&"beta")));
        assert_eq!(data.get_item(6), Some(SearchItem::Message(&"m1")));
        assert_eq!(data.get_item(8), Some(SearchItem::Message(&"m3")));
        assert_eq!(data.get_item(9), None);
    }

    #[test]
    fn test_expanding_a_section_shifts_later_rows() {
        let mut data = filled();
        data.set_expanded(SearchSection::Asset, true);

        assert_eq!(data.count(), 10);
        assert!(!data.asset_show_more());
        assert_eq!(data.get_item(3), Some(SearchItem::Asset(&"BTT")));
        assert_eq!(data.get_item(4), Some(SearchItem::User(&"bob")));
        assert_eq!(data.message_range(), (7, 3));
    }

    #[test]
    fn test_header_ids_stable_per_section() {
        let data = filled();

        let headers: Vec<_> = (0..data.count()).map(|p| data.header_id(p).unwrap()).collect();
        assert_eq!(headers, vec![1, 1, 1, 2, 3, 3, 4, 4, 4]);
        assert_eq!(data.header_id(data.count()), None);
    }

    #[test]
    fn test_tip_row_leads() {
        let mut data = Package::new();
        data.set_data("+8613800138000", None, Some(vec![]), Some(vec!["chat"]));

        assert!(data.show_tip());
        assert_eq!(data.count(), 2);
        assert_eq!(data.get_item(0), Some(SearchItem::Tip));
        assert_eq!(data.header_id(0), Some(-1));
        assert_eq!(data.section_at(1), Some(SearchSection::Chat));
    }

    #[test]
    fn test_tip_suppressed_when_users_match() {
        let mut data = Package::new();
        data.set_data("26596", None, Some(vec!["alice"]), None);
        assert!(!data.show_tip());

        data.set_data("26596", None, None, None);
        assert!(data.show_tip());
    }

    #[test]
    fn test_set_data_clears_messages() {
        let mut data = filled();
        data.set_data("x", None, None, None);

        assert_eq!(data.count(), 0);
        assert_eq!(data.message_range(), (0, 0));
    }

    #[test]
    fn test_new_query_collapses_sections() {
        let mut data = filled();
        data.set_expanded(SearchSection::Asset, true);
        data.set_expanded(SearchSection::Message, true);

        data.set_data("bt", Some(vec!["BTC", "BCH", "BSV", "BTT"]), None, None);
        data.set_messages(vec!["m1", "m2", "m3", "m4"]);

        assert!(data.asset_show_more());
        assert!(data.message_show_more());
        assert_eq!(data.count(), 6);
    }

    #[test]
    fn test_set_query_reevaluates_tip() {
        let mut data = Package::new();
        data.set_data("bt", None, None, Some(vec!["chat"]));
        assert!(!data.show_tip());
        assert_eq!(data.count(), 1);

        data.set_query("+8613800138000");
        assert!(data.show_tip());
        assert_eq!(data.count(), 2);
        assert_eq!(data.get_item(1), Some(SearchItem::Chat(&"chat")));

        data.set_query("+86");
        assert!(!data.show_tip());
    }

    #[test]
    fn test_id_keyword_rules() {
        assert!(is_id_keyword("7000"));
        assert!(is_id_keyword("+8613800138000"));
        assert!(!is_id_keyword("700"));
        assert!(!is_id_keyword("70a0"));
        assert!(!is_id_keyword("+123"));
        assert!(!is_id_keyword("+86+1380013800"));
        assert!(!is_id_keyword("12+34"));
        assert!(!is_id_keyword("+1234567890123456"));
    }
}
