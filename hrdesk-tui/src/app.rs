//! Event loop and key handling.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use futures::StreamExt;
use hrdesk_lib::error::PersistError;
use hrdesk_lib::manage::ActiveDialog;
use hrdesk_lib::manage::RowAction;
use hrdesk_lib::manage::SubmitOutcome;
use hrdesk_lib::manage::SubmitRejected;
use hrdesk_lib::manage::Toast;
use hrdesk_lib::schema::FieldKind;
use hrdesk_lib::schema::FieldSpec;
use hrdesk_lib::store::RecordStore;
use hrdesk_lib::{ManagementTable, Record};
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::error::AppError;
use crate::render;
use crate::terminal::TerminalGuard;

/// How often expired toasts are swept.
const TICK: Duration = Duration::from_millis(250);

/// One admin tab.
pub struct Screen {
    pub title: &'static str,
    pub table: ManagementTable,
    pub store: Arc<dyn RecordStore>,
    /// A fetch is in flight.
    pub loading: bool,
    /// Selected row on the visible page.
    pub cursor: usize,
    /// Selected column, used for sorting and toggling.
    pub column: usize,
    /// Focused field of the open form, indexing [`Screen::editable_fields`].
    pub field: usize,
}

impl Screen {
    pub fn new(title: &'static str, table: ManagementTable, store: Arc<dyn RecordStore>) -> Self {
        Self {
            title,
            table,
            store,
            loading: false,
            cursor: 0,
            column: 0,
            field: 0,
        }
    }

    /// Records on the visible page, in display order.
    pub fn page_rows(&self) -> Vec<&Record> {
        self.table.table().page_rows(self.table.items())
    }

    fn selected_id(&self) -> Option<i64> {
        self.page_rows().get(self.cursor).map(|r| r.id())
    }

    fn clamp_cursor(&mut self) {
        let len = self.page_rows().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Fields the form cursor can land on.
    pub fn editable_fields(&self) -> Vec<&FieldSpec> {
        self.table.fields().iter().filter(|f| !f.readonly).collect()
    }

    fn focused_field(&self) -> Option<FieldSpec> {
        self.editable_fields().get(self.field).map(|f| (*f).clone())
    }
}

/// A toast on screen until `expires`.
pub struct ActiveToast {
    pub toast: Toast,
    pub expires: Instant,
}

/// What a background request produced.
enum TaskResult {
    Loaded(Result<Vec<Record>, PersistError>),
    Submitted(Result<(), PersistError>),
    Toggled(i64, Result<(), PersistError>),
    Deleted(Result<(), PersistError>),
}

struct Completed {
    screen: usize,
    result: TaskResult,
}

/// Which key map applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Table,
    Form,
    Confirm,
    Acknowledge,
}

pub struct App {
    pub(crate) screens: Vec<Screen>,
    pub(crate) current: usize,
    pub(crate) toasts: Vec<ActiveToast>,
    /// Where data comes from, shown in the title bar.
    pub(crate) source: String,
    tx: mpsc::UnboundedSender<Completed>,
    rx: mpsc::UnboundedReceiver<Completed>,
    quit: bool,
}

impl App {
    pub fn new(screens: Vec<Screen>, source: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            screens,
            current: 0,
            toasts: Vec::new(),
            source: source.into(),
            tx,
            rx,
            quit: false,
        }
    }

    /// Run until the user quits.
    pub async fn run(mut self) -> Result<(), AppError> {
        let mut terminal = TerminalGuard::new()?;
        let mut events = EventStream::new();
        let mut tick = tokio::time::interval(TICK);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        for index in 0..self.screens.len() {
            self.refresh(index);
        }
        info!("Started with {} screen(s), data from {}", self.screens.len(), self.source);

        while !self.quit {
            render::draw(terminal.out(), &self)?;

            tokio::select! {
                Some(event) = events.next() => match event {
                    Ok(event) => self.handle_event(event),
                    Err(e) => {
                        error!("Event stream error: {}", e);
                        return Err(e.into());
                    }
                },
                Some(done) = self.rx.recv() => self.complete(done),
                _ = tick.tick() => self.expire_toasts(Instant::now()),
            }
        }

        info!("Exiting");
        Ok(())
    }

    pub(crate) fn screen(&self) -> &Screen {
        &self.screens[self.current]
    }

    fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screens[self.current]
    }

    pub(crate) fn mode(&self) -> Mode {
        match self.screen().table.dialog() {
            ActiveDialog::Closed => Mode::Table,
            ActiveDialog::Add | ActiveDialog::Edit(_) => Mode::Form,
            ActiveDialog::ConfirmDelete(_) => Mode::Confirm,
            ActiveDialog::Acknowledge(_) => Mode::Acknowledge,
        }
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event
            && key.kind == KeyEventKind::Press
        {
            self.handle_key(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }
        match self.mode() {
            Mode::Table => self.table_key(key),
            Mode::Form => self.form_key(key),
            Mode::Confirm => self.confirm_key(key),
            Mode::Acknowledge => self.acknowledge_key(key),
        }
    }

    fn table_key(&mut self, key: KeyEvent) {
        let count = self.screens.len();
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Tab => self.select_screen((self.current + 1) % count),
            KeyCode::BackTab => self.select_screen((self.current + count - 1) % count),
            KeyCode::Char(c @ '1'..='9') => self.select_screen(c as usize - '1' as usize),
            KeyCode::Up | KeyCode::Char('k') => {
                let screen = self.screen_mut();
                screen.cursor = screen.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let screen = self.screen_mut();
                if screen.cursor + 1 < screen.page_rows().len() {
                    screen.cursor += 1;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                let screen = self.screen_mut();
                screen.column = screen.column.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let screen = self.screen_mut();
                if screen.column + 1 < screen.table.columns().len() {
                    screen.column += 1;
                }
            }
            KeyCode::Char('s') => {
                let screen = self.screen_mut();
                if let Some(column) = screen.table.columns().get(screen.column) {
                    let key = column.key.clone();
                    screen.table.table_mut().toggle_sort(&key);
                }
            }
            KeyCode::Char(']') | KeyCode::PageDown => {
                let screen = self.screen_mut();
                let len = screen.table.items().len();
                if screen.table.table_mut().next_page(len) {
                    screen.cursor = 0;
                }
            }
            KeyCode::Char('[') | KeyCode::PageUp => {
                let screen = self.screen_mut();
                let len = screen.table.items().len();
                if screen.table.table_mut().prev_page(len) {
                    screen.cursor = 0;
                }
            }
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('a') => {
                let screen = self.screen_mut();
                screen.field = 0;
                screen.table.open_add();
            }
            KeyCode::Char('e') | KeyCode::Enter => self.row_action(RowAction::Edit),
            KeyCode::Char('d') | KeyCode::Delete => self.row_action(RowAction::Delete),
            KeyCode::Char('r') => {
                let title = self.screen().title.to_lowercase();
                self.push_toast(Toast::info(format!("Refreshing {}", title)));
                self.refresh(self.current);
            }
            _ => {}
        }
    }

    fn row_action(&mut self, action: RowAction) {
        let screen = self.screen_mut();
        if let Some(id) = screen.selected_id()
            && screen.table.apply_action(action, id)
        {
            screen.field = 0;
        }
    }

    fn form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.screen_mut().table.cancel();
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::Down => {
                let screen = self.screen_mut();
                let count = screen.editable_fields().len().max(1);
                screen.field = (screen.field + 1) % count;
            }
            KeyCode::BackTab | KeyCode::Up => {
                let screen = self.screen_mut();
                let count = screen.editable_fields().len().max(1);
                screen.field = (screen.field + count - 1) % count;
            }
            KeyCode::Backspace => {
                let screen = self.screen_mut();
                if let Some(field) = screen.focused_field()
                    && field.kind != FieldKind::Switch
                {
                    let mut text = screen.table.form().effective(&field.key).to_string();
                    text.pop();
                    screen.table.input(&field.key, text);
                }
            }
            KeyCode::Char(c) => {
                let screen = self.screen_mut();
                let Some(field) = screen.focused_field() else {
                    return;
                };
                match field.kind {
                    FieldKind::Switch => {
                        if c == ' ' {
                            screen.table.toggle_field(&field.key);
                        }
                    }
                    FieldKind::Text | FieldKind::Number | FieldKind::Time => {
                        let mut text = screen.table.form().effective(&field.key).to_string();
                        text.push(c);
                        screen.table.input(&field.key, text);
                    }
                }
            }
            _ => {}
        }
    }

    fn confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let index = self.current;
                let screen = &mut self.screens[index];
                if let Some(request) = screen.table.confirm_delete() {
                    let store = Arc::clone(&screen.store);
                    self.spawn(index, async move {
                        TaskResult::Deleted(request.send(store.as_ref()).await)
                    });
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.screen_mut().table.cancel();
            }
            _ => {}
        }
    }

    fn acknowledge_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            self.screen_mut().table.cancel();
        }
    }

    fn select_screen(&mut self, index: usize) {
        if index < self.screens.len() && index != self.current {
            debug!("Switched to {}", self.screens[index].title);
            self.current = index;
        }
    }

    fn submit(&mut self) {
        let index = self.current;
        let screen = &mut self.screens[index];
        match screen.table.begin_submit() {
            Ok(pending) => {
                let store = Arc::clone(&screen.store);
                self.spawn(index, async move {
                    TaskResult::Submitted(pending.send(store.as_ref()).await)
                });
            }
            Err(SubmitRejected::Invalid(errors)) => {
                let first = errors.iter().next().map(|(key, _)| key.to_string());
                if let Some(position) = first.and_then(|key| {
                    screen
                        .editable_fields()
                        .iter()
                        .position(|f| f.key == key)
                }) {
                    screen.field = position;
                }
            }
            Err(rejected) => debug!("Submit ignored: {}", rejected),
        }
    }

    fn toggle_selected(&mut self) {
        let index = self.current;
        let screen = &mut self.screens[index];
        let Some(id) = screen.selected_id() else {
            return;
        };
        let Some(key) = screen
            .table
            .columns()
            .get(screen.column)
            .map(|c| c.key.clone())
        else {
            return;
        };
        let Some(request) = screen.table.begin_toggle(id, &key) else {
            debug!("Toggle of {} on row {} ignored", key, id);
            return;
        };
        let store = Arc::clone(&screen.store);
        self.spawn(index, async move {
            TaskResult::Toggled(id, request.send(store.as_ref()).await)
        });
    }

    /// Refetch a screen's records in the background.
    fn refresh(&mut self, index: usize) {
        let Some(screen) = self.screens.get_mut(index) else {
            return;
        };
        screen.loading = true;
        let store = Arc::clone(&screen.store);
        self.spawn(index, async move { TaskResult::Loaded(store.list().await) });
    }

    fn spawn<F>(&self, screen: usize, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = task.await;
            // The receiver only closes on exit.
            let _ = tx.send(Completed { screen, result });
        });
    }

    fn complete(&mut self, done: Completed) {
        let Some(screen) = self.screens.get_mut(done.screen) else {
            return;
        };

        let mut toasts = Vec::new();
        let refetch = match done.result {
            TaskResult::Loaded(Ok(items)) => {
                debug!("Loaded {} {}", items.len(), screen.title);
                screen.loading = false;
                screen.table.set_items(items);
                screen.clamp_cursor();
                false
            }
            TaskResult::Loaded(Err(err)) => {
                warn!("Failed to load {}: {}", screen.title, err);
                screen.loading = false;
                toasts.push(Toast::error(format!(
                    "Failed to load {}: {}",
                    screen.title.to_lowercase(),
                    err
                )));
                false
            }
            TaskResult::Submitted(result) => {
                screen.table.finish_submit(result) == SubmitOutcome::Saved
            }
            TaskResult::Toggled(id, result) => screen.table.finish_toggle(id, result),
            TaskResult::Deleted(result) => screen.table.finish_delete(result),
        };
        toasts.extend(screen.table.take_toasts());

        for toast in toasts {
            self.push_toast(toast);
        }
        if refetch {
            self.refresh(done.screen);
        }
    }

    fn push_toast(&mut self, toast: Toast) {
        let expires = Instant::now() + toast.duration;
        self.toasts.push(ActiveToast { toast, expires });
    }

    fn expire_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires > now);
    }
}

#[cfg(test)]
mod tests {
    use hrdesk_lib::store::MemoryStore;
    use hrdesk_lib::{FieldSpec, Value};

    use super::*;

    fn app() -> App {
        let fields = vec![
            FieldSpec::text("name", "Name"),
            FieldSpec::switch("is_active", "Active"),
        ];
        let store = MemoryStore::new("Role").unique("name").with_records(vec![
            Record::new(1).set("name", "Admin").set("is_active", true),
            Record::new(2).set("name", "Intern").set("is_active", false),
        ]);
        let table = ManagementTable::new("Role", fields).unwrap();
        App::new(
            vec![Screen::new("Roles", table, Arc::new(store))],
            "offline",
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Apply the next finished background request.
    async fn settle(app: &mut App) {
        let done = app.rx.recv().await.unwrap();
        app.complete(done);
    }

    async fn loaded() -> App {
        let mut app = app();
        app.refresh(0);
        settle(&mut app).await;
        app
    }

    #[tokio::test]
    async fn test_initial_load() {
        let app = loaded().await;
        assert!(!app.screen().loading);
        assert_eq!(app.screen().table.items().len(), 2);
        assert_eq!(app.mode(), Mode::Table);
    }

    #[tokio::test]
    async fn test_add_through_form() {
        let mut app = loaded().await;

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.mode(), Mode::Form);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen().table.errors().get("name"), Some("Name is required"));

        type_text(&mut app, "Auditor");
        press(&mut app, KeyCode::Enter);
        assert!(app.screen().table.is_submitting());

        settle(&mut app).await;
        assert_eq!(app.mode(), Mode::Table);
        assert_eq!(app.toasts[0].toast.message, "Role added successfully");

        settle(&mut app).await;
        let names: Vec<Value> = app
            .screen()
            .table
            .items()
            .iter()
            .map(|r| r.value("name"))
            .collect();
        assert!(names.contains(&Value::from("Auditor")));
    }

    #[tokio::test]
    async fn test_backspace_edits_snapshot_value() {
        let mut app = loaded().await;
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(
            app.screen().table.form().effective("name"),
            Value::from("Admi")
        );
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode(), Mode::Table);
    }

    #[tokio::test]
    async fn test_toggle_selected_cell() {
        let mut app = loaded().await;
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char(' '));

        settle(&mut app).await;
        settle(&mut app).await;
        let intern = app.screen().table.record(2).unwrap();
        assert_eq!(intern.is_active(), Some(true));
    }

    #[tokio::test]
    async fn test_repeated_toggle_waits_for_first() {
        let mut app = loaded().await;
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char(' '));
        assert!(app.screen().table.is_toggling(2));
        press(&mut app, KeyCode::Char(' '));

        settle(&mut app).await;
        assert!(!app.screen().table.is_toggling(2));
        assert_eq!(app.toasts.len(), 1);

        settle(&mut app).await;
        let intern = app.screen().table.record(2).unwrap();
        assert_eq!(intern.is_active(), Some(true));
        assert!(app.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let mut app = loaded().await;

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.mode(), Mode::Confirm);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.mode(), Mode::Table);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        settle(&mut app).await;
        assert_eq!(app.mode(), Mode::Acknowledge);

        settle(&mut app).await;
        assert_eq!(app.screen().table.items().len(), 1);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode(), Mode::Table);
    }

    #[tokio::test]
    async fn test_refresh_key_reloads() {
        let mut app = loaded().await;
        press(&mut app, KeyCode::Char('r'));
        assert!(app.screen().loading);
        assert_eq!(app.toasts[0].toast.message, "Refreshing roles");

        settle(&mut app).await;
        assert!(!app.screen().loading);
        assert_eq!(app.screen().table.items().len(), 2);
    }

    #[tokio::test]
    async fn test_toasts_expire() {
        let mut app = loaded().await;
        app.push_toast(Toast::info("hello"));
        app.expire_toasts(Instant::now());
        assert_eq!(app.toasts.len(), 1);
        app.expire_toasts(Instant::now() + Duration::from_secs(60));
        assert!(app.toasts.is_empty());
    }

    #[test]
    fn test_quit_keys() {
        let mut first = app();
        press(&mut first, KeyCode::Char('q'));
        assert!(first.quit);

        let mut second = app();
        second.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(second.quit);
    }
}
