//! The TUI controller.
//!
//! [`SlackTui`] owns every [`Team`], the [`Session`] and the [`View`]. It is
//! the only place team effects meet the screen:
//! - render requests are painted only for the focused team
//! - notifications go to the [`Notifier`] whatever the focus
//! - provider tasks are queued in a `FuturesUnordered` and their completions
//!   come back through [`SlackTui::apply`]
//!
//! Nothing here spawns. The event loop polls [`SlackTui::next_completion`]
//! next to the keyboard and the real-time streams, so every handler runs to
//! completion before the next one starts.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use futures::stream::{BoxStream, FuturesUnordered, SelectAll};
use futures::{FutureExt, StreamExt};
use indexmap::IndexMap;
use slack_tui_api::config::CONFIG_FILE_NAME;
use slack_tui_api::{
    ConfigPaths, RtmEvent, RtmOptions, RtmSubscription, SlackApi, SlackError, SlackResult,
    TeamConfigEntry, load_team_tokens,
};
use tracing::{debug, info, warn};

use crate::conversation::canonical_name;
use crate::notification::Notifier;
use crate::session::Session;
use crate::team::{Team, TeamEffects, TeamUpdate, ViewRequest};
use crate::view::{View, ViewEvent};

/// Builds the provider handle for one configured workspace.
pub type ApiFactory = Box<dyn Fn(&TeamConfigEntry) -> SlackResult<Arc<dyn SlackApi>> + Send>;

/// A team task tagged with the team it belongs to.
type PendingTask = BoxFuture<'static, (String, TeamUpdate)>;

/// Real-time events from every team, tagged by team name.
pub type RealtimeStream = SelectAll<BoxStream<'static, (String, RtmEvent)>>;

/// The controller.
pub struct SlackTui {
    /// Where the team list lives. An error here (no home directory) is
    /// reported like an unreadable file.
    config_paths: SlackResult<ConfigPaths>,
    teams: IndexMap<String, Team>,
    session: Session,
    view: View,
    notifier: Box<dyn Notifier>,
    api_factory: ApiFactory,
    pending: FuturesUnordered<PendingTask>,
    loading_reported: bool,
}

impl std::fmt::Debug for SlackTui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackTui")
            .field("config_paths", &self.config_paths)
            .field("teams", &self.teams.keys().collect::<Vec<_>>())
            .field("session", &self.session)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl SlackTui {
    pub fn new(
        config_paths: SlackResult<ConfigPaths>,
        api_factory: ApiFactory,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            config_paths,
            teams: IndexMap::new(),
            session: Session::new(),
            view: View::new(),
            notifier,
            api_factory,
            pending: FuturesUnordered::new(),
            loading_reported: false,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.get(name)
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    /// Read the team list. A missing or broken file is reported in the
    /// content pane and yields no teams.
    pub fn load_config(&mut self) -> Vec<TeamConfigEntry> {
        let result = match &self.config_paths {
            Ok(paths) => load_team_tokens(paths),
            Err(SlackError::ConfigUnreadable { path, reason }) => {
                Err(SlackError::ConfigUnreadable {
                    path: path.clone(),
                    reason: reason.clone(),
                })
            }
            Err(e) => Err(SlackError::Internal(e.to_string())),
        };

        match result {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Team list unavailable: {}", e);
                let path = match (&e, &self.config_paths) {
                    (SlackError::ConfigUnreadable { path, .. }, _) => path.clone(),
                    (_, Ok(paths)) => paths.display_path().to_path_buf(),
                    (_, Err(_)) => PathBuf::from(CONFIG_FILE_NAME),
                };
                let expected = match &self.config_paths {
                    Ok(paths) => paths.current.display().to_string(),
                    Err(_) => format!("~/{}", CONFIG_FILE_NAME),
                };
                self.view
                    .log(&format!("Error: failed to read {}", path.display()));
                self.view.log(&format!(
                    "Create {} as [{{\"name\": \"<team>\", \"token\": \"xoxp-...\"}}] and restart.",
                    expected
                ));
                Vec::new()
            }
        }
    }

    /// Create every configured team and start loading them.
    pub fn start(&mut self) {
        self.view.log("Loading...");

        for entry in self.load_config() {
            let api = match (self.api_factory)(&entry) {
                Ok(api) => api,
                Err(e) => {
                    warn!("{}: could not create client: {}", entry.name(), e);
                    self.view.log(&format!("Error: {}: {}", entry.name(), e));
                    continue;
                }
            };
            if self.teams.contains_key(entry.name()) {
                debug!("Duplicate team {}, keeping the last entry", entry.name());
            }
            self.teams
                .insert(entry.name().to_string(), Team::new(entry.name(), api));
        }
        info!("Starting {} team(s)", self.teams.len());

        let names: Vec<String> = self.teams.keys().cloned().collect();
        for name in names {
            if let Some(team) = self.teams.get_mut(&name) {
                let effects = team.load();
                self.dispatch(&name, effects);
            }
        }

        self.refresh_team_list();
        self.report_loading_complete();
    }

    /// Focus the team whose list label is `label` and repaint its lists.
    ///
    /// An exact name wins over the undecorated one, so a team whose own name
    /// ends in `(...)` resolves both while loading and after.
    pub fn focus_team_by_name(&mut self, label: &str) {
        let name = if self.teams.contains_key(label.trim_end()) {
            label.trim_end()
        } else {
            canonical_name(label)
        };
        let Some(team) = self.teams.get(name) else {
            debug!("No team named {}", name);
            return;
        };

        self.session = self.session.focus(name);
        self.view.channels.set_items(Vec::new());
        self.view.users.set_items(Vec::new());
        for request in team.render_lists() {
            self.view.apply_request(&request);
        }
    }

    pub fn select_channel(&mut self, label: &str) {
        self.with_focused_team(|team| team.select_channel(label));
    }

    /// Open a direct message with the user at `index` in the user list.
    pub fn select_user(&mut self, index: usize) {
        self.with_focused_team(|team| match team.user_at(index).cloned() {
            Some(user) => team.open_im(&user.id, &user.name),
            None => TeamEffects::none(),
        });
    }

    pub fn send_message(&mut self, text: &str) {
        let now = Instant::now();
        self.with_focused_team(|team| team.send_message(text, now));
    }

    /// Fold a finished provider call into its team.
    pub fn apply(&mut self, (name, update): (String, TeamUpdate)) {
        let Some(team) = self.teams.get_mut(&name) else {
            debug!("Dropping update for unknown team {}", name);
            return;
        };

        let effects = team.apply(update);
        self.dispatch(&name, effects);
        self.refresh_team_list();
        self.report_loading_complete();
    }

    /// React to a real-time event from `name`.
    pub fn handle_realtime(&mut self, name: &str, event: RtmEvent) {
        match event {
            RtmEvent::Message(message) => {
                let now = Instant::now();
                let Some(team) = self.teams.get_mut(name) else {
                    return;
                };
                let effects = team.handle_message(&message, now);
                self.dispatch(name, effects);
            }
            RtmEvent::Hello => debug!("{}: real-time stream connected", name),
            RtmEvent::Goodbye => debug!("{}: real-time stream closing", name),
            RtmEvent::Unknown => {}
        }
    }

    /// Route an operator action.
    pub fn handle_view_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::TeamSelected(label) => self.focus_team_by_name(&label),
            ViewEvent::ChannelSelected(label) => self.select_channel(&label),
            ViewEvent::UserSelected(index) => self.select_user(index),
            ViewEvent::Submit(text) => self.send_message(&text),
            ViewEvent::Quit => debug!("Quit is handled by the event loop"),
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The next provider call to finish, or `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<(String, TeamUpdate)> {
        self.pending.next().await
    }

    /// Apply completions until nothing is in flight.
    pub async fn run_pending(&mut self) {
        while let Some(completion) = self.next_completion().await {
            self.apply(completion);
        }
    }

    /// Open one real-time subscription per team.
    pub fn subscribe_realtime(&self, options: RtmOptions) -> RealtimeStream {
        let streams = self.teams.values().map(|team| {
            let name = team.name().to_string();
            RtmSubscription::spawn(team.api(), options.clone())
                .map(move |event| (name.clone(), event))
                .boxed()
        });
        futures::stream::select_all(streams)
    }

    fn with_focused_team(&mut self, f: impl FnOnce(&mut Team) -> TeamEffects) {
        let Some(name) = self.session.focused_team().map(str::to_string) else {
            debug!("No team focused");
            return;
        };
        let Some(team) = self.teams.get_mut(&name) else {
            return;
        };
        let effects = f(team);
        self.dispatch(&name, effects);
    }

    fn dispatch(&mut self, name: &str, effects: TeamEffects) {
        let focused = self.session.is_focused(name);
        for request in effects.requests {
            match request {
                ViewRequest::Notify(body) => self.notifier.notify(&body),
                request if focused => self.view.apply_request(&request),
                request => debug!("{}: not focused, dropping {:?}", name, request),
            }
        }

        for task in effects.tasks {
            let name = name.to_string();
            self.pending
                .push(task.map(move |update| (name, update)).boxed());
        }
    }

    fn refresh_team_list(&mut self) {
        let labels = self.teams.values().map(Team::selector_label).collect();
        self.view.teams.set_items(labels);
    }

    fn report_loading_complete(&mut self) {
        if self.loading_reported {
            return;
        }
        let done = self
            .teams
            .values()
            .all(|team| team.is_loaded() && !team.is_updating_info());
        if done {
            self.loading_reported = true;
            self.view.log("Loading complete!");
            self.view.log("To begin, select a team from the left");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ApiCall, RecordingApi};
    use pretty_assertions::assert_eq;
    use slack_tui_api::MessageEvent;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct RecordingNotifier(Arc<Mutex<Vec<String>>>);

    impl Notifier for RecordingNotifier {
        fn notify(&self, body: &str) {
            self.0.lock().unwrap().push(body.to_string());
        }
    }

    impl RecordingNotifier {
        fn shown(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct Fixture {
        tui: SlackTui,
        api: Arc<RecordingApi>,
        notifier: RecordingNotifier,
        dir: TempDir,
    }

    fn fixture(config: &str) -> Fixture {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("teams.json");
        std::fs::write(&path, config).unwrap();

        let api = Arc::new(RecordingApi::acme());
        let shared = Arc::clone(&api);
        let factory: ApiFactory = Box::new(move |_entry| {
            let api: Arc<dyn SlackApi> = shared.clone();
            Ok(api)
        });
        let notifier = RecordingNotifier::default();

        Fixture {
            tui: SlackTui::new(
                Ok(ConfigPaths::single(path)),
                factory,
                Box::new(notifier.clone()),
            ),
            api,
            notifier,
            dir,
        }
    }

    fn message(channel: &str) -> RtmEvent {
        RtmEvent::Message(MessageEvent {
            channel: channel.to_string(),
            user: Some("U2".to_string()),
            text: "ping".to_string(),
            ts: None,
            subtype: None,
            bot_id: None,
        })
    }

    #[tokio::test]
    async fn test_start_reports_progress() {
        let mut f = fixture(r#"[["xoxb-1","Acme"]]"#);
        f.tui.start();

        assert_eq!(f.tui.view().teams.items(), &["Acme".to_string()]);
        assert_eq!(f.tui.view().content.lines().last().unwrap(), "Loading...");
        assert!(f.tui.has_pending());

        f.tui.run_pending().await;

        assert_eq!(f.tui.view().teams.items(), &["Acme (2)".to_string()]);
        let lines = f.tui.view().content.lines();
        assert_eq!(
            lines[lines.len() - 2..].to_vec(),
            vec![
                "Loading complete!".to_string(),
                "To begin, select a team from the left".to_string()
            ]
        );
        // Nothing is focused yet, so nothing was painted.
        assert!(f.tui.view().channels.is_empty());
    }

    #[tokio::test]
    async fn test_missing_config_continues_without_teams() {
        let mut f = fixture("[]");
        f.tui.config_paths = Ok(ConfigPaths::single(f.dir.path().join("missing.json")));
        f.tui.start();

        let lines = f.tui.view().content.lines();
        assert!(lines.iter().any(|l| l.starts_with("Error: failed to read ")
            && l.ends_with("missing.json")));
        assert_eq!(f.tui.teams().count(), 0);
        assert!(!f.tui.has_pending());
    }

    #[tokio::test]
    async fn test_unknown_home_directory_continues_without_teams() {
        let mut f = fixture("[]");
        f.tui.config_paths = Err(SlackError::ConfigUnreadable {
            path: PathBuf::from(CONFIG_FILE_NAME),
            reason: "could not determine home directory".to_string(),
        });
        f.tui.start();

        let lines = f.tui.view().content.lines();
        assert!(lines.contains(&"Error: failed to read .slack-tui.json".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("Create ~/.slack-tui.json as ")));
        assert!(lines.contains(&"Loading complete!".to_string()));
        assert_eq!(f.tui.teams().count(), 0);
    }

    #[tokio::test]
    async fn test_parenthesised_team_name_focuses_while_loading_and_after() {
        let mut f = fixture(r#"[{"name":"Acme (EU)","token":"xoxb-1"}]"#);
        f.tui.start();

        assert_eq!(f.tui.view().teams.items(), &["Acme (EU)".to_string()]);
        f.tui
            .handle_view_event(ViewEvent::TeamSelected("Acme (EU)".to_string()));
        assert_eq!(f.tui.session().focused_team(), Some("Acme (EU)"));

        f.tui.run_pending().await;
        assert_eq!(f.tui.view().teams.items(), &["Acme (EU) (2)".to_string()]);

        f.tui.session = Session::new();
        f.tui
            .handle_view_event(ViewEvent::TeamSelected("Acme (EU) (2)".to_string()));
        assert_eq!(f.tui.session().focused_team(), Some("Acme (EU)"));
        assert_eq!(
            f.tui.view().channels.items(),
            &["general (2)".to_string(), "random (0)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_duplicate_team_names_keep_one_team() {
        let mut f = fixture(r#"[["xoxb-1","Acme"],{"name":"Acme","token":"xoxb-2"}]"#);
        f.tui.start();
        assert_eq!(f.tui.teams().count(), 1);
    }

    #[tokio::test]
    async fn test_focus_paints_lists_and_selection_shows_history() {
        let mut f = fixture(r#"[["xoxb-1","Acme"]]"#);
        f.tui.start();
        f.tui.run_pending().await;

        f.tui.handle_view_event(ViewEvent::TeamSelected("Acme (2)".to_string()));
        assert_eq!(f.tui.session().focused_team(), Some("Acme"));
        assert_eq!(
            f.tui.view().channels.items(),
            &["general (2)".to_string(), "random (0)".to_string()]
        );
        assert_eq!(
            f.tui.view().users.items(),
            &["@alice".to_string(), "@bob".to_string()]
        );

        f.tui
            .handle_view_event(ViewEvent::ChannelSelected("general (2)".to_string()));
        f.tui.run_pending().await;

        assert_eq!(f.tui.view().content.label(), Some("Acme/#general"));
        assert_eq!(
            f.tui.view().content.lines().to_vec(),
            vec![
                "alice: first".to_string(),
                "bob: second".to_string(),
                ": from nowhere".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_unfocused_team_output_is_dropped() {
        let mut f = fixture(r#"[["xoxb-1","Acme"],["xoxb-2","Globex"]]"#);
        f.tui.start();
        f.tui.run_pending().await;

        f.tui.focus_team_by_name("Acme");
        f.tui.select_channel("general");
        f.tui.focus_team_by_name("Globex");
        f.tui.run_pending().await;

        assert_eq!(
            f.tui.view().content.lines().to_vec(),
            vec!["Loading #general(C1) ...".to_string()]
        );
        let acme = f.tui.team("Acme").unwrap();
        assert_eq!(acme.current_conversation().unwrap().id(), "C1");
    }

    #[tokio::test]
    async fn test_select_user_opens_im() {
        let mut f = fixture(r#"[["xoxb-1","Acme"]]"#);
        f.tui.start();
        f.tui.run_pending().await;
        f.tui.focus_team_by_name("Acme");

        f.tui.handle_view_event(ViewEvent::UserSelected(1));
        f.tui.run_pending().await;

        let current = f.tui.team("Acme").unwrap().current_conversation().unwrap();
        assert_eq!(current.name(), "bob");
        assert!(f.api.calls().contains(&ApiCall::OpenConversation("U2".to_string())));
        assert_eq!(f.tui.view().content.label(), Some("Acme/@bob"));
    }

    #[tokio::test]
    async fn test_submit_without_focus_is_noop() {
        let mut f = fixture(r#"[["xoxb-1","Acme"]]"#);
        f.tui.start();
        f.tui.run_pending().await;
        let before = f.api.calls().len();

        f.tui.handle_view_event(ViewEvent::Submit("hi".to_string()));
        assert!(!f.tui.has_pending());
        assert_eq!(f.api.calls().len(), before);
    }

    #[tokio::test]
    async fn test_notifications_bypass_focus_but_respect_suppression() {
        let mut f = fixture(r#"[["xoxb-1","Acme"]]"#);
        f.tui.start();
        f.tui.run_pending().await;

        f.tui.handle_realtime("Acme", message("C2"));
        assert_eq!(f.notifier.shown(), vec!["New message on Acme".to_string()]);

        f.tui.focus_team_by_name("Acme");
        f.tui.select_channel("general");
        f.tui.send_message("hi");
        f.tui.handle_realtime("Acme", message("C1"));
        assert_eq!(f.notifier.shown().len(), 1);

        f.tui.handle_realtime("Acme", RtmEvent::Hello);
        f.tui.handle_realtime("Nobody", message("C1"));
        assert_eq!(f.notifier.shown().len(), 1);
    }
}
