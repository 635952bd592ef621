// Navigation state - tab bar + challenge router
//
// Plain owned state, handed to whoever renders or mutates it (see AppState).
// No globals.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Challenges,
    Savings,
    Stats,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Home, Tab::Challenges, Tab::Savings, Tab::Stats, Tab::Settings];

    pub fn next(&self) -> Self {
        match self {
            Tab::Home => Tab::Challenges,
            Tab::Challenges => Tab::Savings,
            Tab::Savings => Tab::Stats,
            Tab::Stats => Tab::Settings,
            Tab::Settings => Tab::Home,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Tab::Home => Tab::Settings,
            Tab::Challenges => Tab::Home,
            Tab::Savings => Tab::Challenges,
            Tab::Stats => Tab::Savings,
            Tab::Settings => Tab::Stats,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Tab::Home => "Home",
            Tab::Challenges => "Challenges",
            Tab::Savings => "Savings",
            Tab::Stats => "Stats",
            Tab::Settings => "Settings",
        }
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }
}

// ============================================================================
// TAB BAR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabBarState {
    pub selected: Tab,
    pub visible: bool,
}

impl Default for TabBarState {
    fn default() -> Self {
        TabBarState {
            selected: Tab::Home,
            visible: true,
        }
    }
}

impl TabBarState {
    pub fn select(&mut self, tab: Tab) {
        self.selected = tab;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

// ============================================================================
// CHALLENGE ROUTER
// ============================================================================

/// Stack of challenge ids; the last one is on screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChallengeRouter {
    path: Vec<String>,
}

impl ChallengeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole path with just this challenge
    pub fn navigate_to(&mut self, challenge_id: &str) {
        self.path = vec![challenge_id.to_string()];
    }

    pub fn push(&mut self, challenge_id: &str) {
        self.path.push(challenge_id.to_string());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.path.pop()
    }

    pub fn pop_to_root(&mut self) {
        self.path.clear();
    }

    pub fn current(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn is_at_root(&self) -> bool {
        self.path.is_empty()
    }
}

// ============================================================================
// APP STATE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub tab_bar: TabBarState,
    pub router: ChallengeRouter,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a challenge full-screen: Challenges tab, tab bar hidden
    pub fn open_challenge(&mut self, challenge_id: &str) {
        self.tab_bar.select(Tab::Challenges);
        self.tab_bar.hide();
        self.router.navigate_to(challenge_id);
    }

    /// Step back one level; the tab bar comes back once the path is empty
    pub fn close_challenge(&mut self) -> Option<String> {
        let closed = self.router.pop();
        if self.router.is_at_root() {
            self.tab_bar.show();
        }
        closed
    }

    /// Switching tabs always drops any open challenge
    pub fn switch_tab(&mut self, tab: Tab) {
        self.router.pop_to_root();
        self.tab_bar.select(tab);
        self.tab_bar.show();
    }
}
