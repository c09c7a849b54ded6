use crate::post_form::{PostForm, TextField};
use crate::post_store::StoreError;
use crate::schedule::sorted_by_schedule;
use crate::scheduled_post::{Platform, PostDraft, PostId, ScheduledPost};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

pub enum Action {
    Schedule(PostDraft),
    Delete(PostId),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Content,
    Image,
    Platforms,
    Date,
    Time,
}

impl FormField {
    const ORDER: [FormField; 6] = [
        FormField::Title,
        FormField::Content,
        FormField::Image,
        FormField::Platforms,
        FormField::Date,
        FormField::Time,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn text_field(self) -> Option<TextField> {
        match self {
            FormField::Title => Some(TextField::Title),
            FormField::Content => Some(TextField::Content),
            FormField::Image => Some(TextField::ImagePath),
            FormField::Date => Some(TextField::Date),
            FormField::Time => Some(TextField::Time),
            FormField::Platforms => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Browse,
    Compose(FormField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
    shown_at: Instant,
}

pub struct App {
    pub form: PostForm,
    focus: Focus,
    selected: usize,
    platform_cursor: usize,
    show_detail: bool,
    toast: Option<Toast>,
    toast_duration: Duration,
}

impl App {
    pub fn new(toast_duration: Duration) -> Self {
        App {
            form: PostForm::new(),
            focus: Focus::Browse,
            selected: 0,
            platform_cursor: 0,
            show_detail: false,
            toast: None,
            toast_duration,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn platform_cursor(&self) -> Platform {
        Platform::ALL[self.platform_cursor]
    }

    pub fn show_detail(&self) -> bool {
        self.show_detail
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// Index into the chronologically sorted list.
    pub fn selected_index(&self, len: usize) -> usize {
        self.selected.min(len.saturating_sub(1))
    }

    pub fn selected_post<'a>(&self, posts: &'a [ScheduledPost]) -> Option<&'a ScheduledPost> {
        let sorted = sorted_by_schedule(posts);
        sorted.get(self.selected_index(sorted.len())).copied()
    }

    pub fn notify(&mut self, kind: ToastKind, title: &str, description: &str) {
        self.toast = Some(Toast {
            kind,
            title: title.to_string(),
            description: description.to_string(),
            shown_at: Instant::now(),
        });
    }

    /// Drop the toast once it has been visible long enough.
    pub fn tick(&mut self, now: Instant) {
        if let Some(toast) = &self.toast {
            if now.duration_since(toast.shown_at) >= self.toast_duration {
                self.toast = None;
            }
        }
    }

    pub fn post_scheduled(&mut self) {
        self.form.reset();
        self.platform_cursor = 0;
        self.focus = Focus::Compose(FormField::Title);
        self.notify(
            ToastKind::Success,
            "Post scheduled!",
            "Your post has been scheduled successfully",
        );
    }

    pub fn post_deleted(&mut self, remaining: usize) {
        self.selected = self.selected_index(remaining);
        if remaining == 0 {
            self.show_detail = false;
        }
    }

    pub fn save_failed(&mut self, error: &StoreError) {
        self.notify(ToastKind::Error, "Could not save", &error.to_string());
    }

    pub fn handle_key(&mut self, key: KeyEvent, posts: &[ScheduledPost]) -> Option<Action> {
        // AltGr arrives as Ctrl+Alt and must still type its character.
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL)
            && !key.modifiers.contains(KeyModifiers::ALT);
        if ctrl {
            return match key.code {
                KeyCode::Char('c') => Some(Action::Quit),
                KeyCode::Char('s') => self.submit(),
                _ => None,
            };
        }

        match self.focus {
            Focus::Browse => self.handle_browse_key(key.code, posts),
            Focus::Compose(field) => self.handle_compose_key(key.code, field),
        }
    }

    fn submit(&mut self) -> Option<Action> {
        match self.form.validate() {
            Ok(draft) => Some(Action::Schedule(draft)),
            Err(e) => {
                self.notify(ToastKind::Error, e.title(), &e.to_string());
                None
            }
        }
    }

    fn handle_browse_key(&mut self, code: KeyCode, posts: &[ScheduledPost]) -> Option<Action> {
        let len = posts.len();
        match code {
            KeyCode::Char('q') => return Some(Action::Quit),
            KeyCode::Char('n') | KeyCode::Tab => {
                self.focus = Focus::Compose(FormField::Title);
                self.show_detail = false;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected_index(len).saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if len > 0 {
                    self.selected = (self.selected_index(len) + 1).min(len - 1);
                }
            }
            KeyCode::Enter if len > 0 => self.show_detail = !self.show_detail,
            KeyCode::Esc => self.show_detail = false,
            KeyCode::Char('d') | KeyCode::Delete => {
                return self
                    .selected_post(posts)
                    .map(|post| Action::Delete(post.id.clone()));
            }
            _ => {}
        }
        None
    }

    fn handle_compose_key(&mut self, code: KeyCode, field: FormField) -> Option<Action> {
        match code {
            KeyCode::Esc => self.focus = Focus::Browse,
            KeyCode::Tab => self.focus = Focus::Compose(field.next()),
            KeyCode::BackTab => self.focus = Focus::Compose(field.prev()),
            _ if field == FormField::Platforms => self.handle_platform_key(code),
            KeyCode::Enter => match field {
                FormField::Content => self.form.push_char(TextField::Content, '\n'),
                FormField::Image if !self.form.text(TextField::ImagePath).trim().is_empty() => {
                    match self.form.attach_typed_image() {
                        Ok(()) => {
                            let name = self
                                .form
                                .image()
                                .map(|i| i.file_name.clone())
                                .unwrap_or_default();
                            self.notify(ToastKind::Success, "Image attached", &name);
                        }
                        Err(e) => self.notify(ToastKind::Error, e.title(), &e.to_string()),
                    }
                }
                _ => self.focus = Focus::Compose(field.next()),
            },
            KeyCode::Delete if field == FormField::Image => self.form.remove_image(),
            KeyCode::Backspace => {
                if let Some(text) = field.text_field() {
                    self.form.pop_char(text);
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = field.text_field() {
                    self.form.push_char(text, c);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_platform_key(&mut self, code: KeyCode) {
        let count = Platform::ALL.len();
        match code {
            KeyCode::Left => self.platform_cursor = (self.platform_cursor + count - 1) % count,
            KeyCode::Right => self.platform_cursor = (self.platform_cursor + 1) % count,
            KeyCode::Char(' ') => self.form.toggle_platform(self.platform_cursor()),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.platform_cursor = index;
                self.form.toggle_platform(Platform::ALL[index]);
            }
            KeyCode::Enter => self.focus = Focus::Compose(FormField::Platforms.next()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post_store::PostStore;
    use crate::storage::MemoryStorage;

    fn press(app: &mut App, posts: &[ScheduledPost], code: KeyCode) -> Option<Action> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), posts)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, &[], KeyCode::Char(c));
        }
    }

    fn ctrl(app: &mut App, c: char) -> Option<Action> {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL), &[])
    }

    /// Fill every field of the form through key presses.
    fn compose_launch_post(app: &mut App) {
        press(app, &[], KeyCode::Char('n'));
        type_text(app, "Launch");
        press(app, &[], KeyCode::Tab);
        type_text(app, "Hello world");
        press(app, &[], KeyCode::Tab);
        press(app, &[], KeyCode::Tab);
        press(app, &[], KeyCode::Char('1'));
        press(app, &[], KeyCode::Enter);
        type_text(app, "2099-01-01");
        press(app, &[], KeyCode::Enter);
        type_text(app, "09:00");
    }

    #[test]
    fn scheduling_through_the_keyboard_adds_one_post() {
        let mut store = PostStore::load(MemoryStorage::new());
        let mut app = App::new(Duration::from_secs(3));
        compose_launch_post(&mut app);
        assert_eq!(app.focus(), Focus::Compose(FormField::Time));

        let Some(Action::Schedule(draft)) = ctrl(&mut app, 's') else {
            panic!("expected a schedule action");
        };
        store.add(draft).unwrap();
        app.post_scheduled();

        let posts = store.list();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Launch");
        assert_eq!(posts[0].content, "Hello world");
        assert_eq!(posts[0].platforms, vec![Platform::Twitter]);
        assert_eq!(posts[0].scheduled_date, "2099-01-01");
        assert_eq!(posts[0].scheduled_time, "09:00");
        assert_eq!(app.form.text(TextField::Title), "");
        assert_eq!(app.toast().map(|t| t.kind), Some(ToastKind::Success));
    }

    #[test]
    fn invalid_submit_shows_error_and_keeps_the_form() {
        let mut app = App::new(Duration::from_secs(3));
        compose_launch_post(&mut app);
        app.form.set_text(TextField::Title, "");

        assert!(ctrl(&mut app, 's').is_none());

        let toast = app.toast().expect("toast");
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.title, "Title required");
        assert_eq!(app.form.text(TextField::Content), "Hello world");
    }

    #[test]
    fn delete_targets_the_selected_post_in_schedule_order() {
        let mut store = PostStore::load(MemoryStorage::new());
        for (title, date) in [("later", "2025-02-01"), ("sooner", "2025-01-01")] {
            store
                .add(PostDraft {
                    title: title.to_string(),
                    content: "c".to_string(),
                    image: None,
                    platforms: vec![Platform::Instagram],
                    scheduled_date: date.to_string(),
                    scheduled_time: "09:00".to_string(),
                })
                .unwrap();
        }
        let mut app = App::new(Duration::from_secs(3));

        let Some(Action::Delete(id)) = press(&mut app, store.list(), KeyCode::Char('d')) else {
            panic!("expected a delete action");
        };
        assert_eq!(store.get(&id).map(|p| p.title.as_str()), Some("sooner"));

        press(&mut app, store.list(), KeyCode::Down);
        let Some(Action::Delete(id)) = press(&mut app, store.list(), KeyCode::Delete) else {
            panic!("expected a delete action");
        };
        store.delete(&id).unwrap();
        app.post_deleted(store.list().len());

        assert_eq!(store.list()[0].title, "sooner");
        assert_eq!(app.selected_index(store.list().len()), 0);
    }

    #[test]
    fn delete_with_nothing_listed_does_nothing() {
        let mut app = App::new(Duration::from_secs(3));
        assert!(press(&mut app, &[], KeyCode::Char('d')).is_none());
        assert!(press(&mut app, &[], KeyCode::Enter).is_none());
        assert!(!app.show_detail());
    }

    #[test]
    fn platform_keys_toggle_and_move_the_cursor() {
        let mut app = App::new(Duration::from_secs(3));
        press(&mut app, &[], KeyCode::Char('n'));
        press(&mut app, &[], KeyCode::BackTab);
        press(&mut app, &[], KeyCode::BackTab);
        press(&mut app, &[], KeyCode::BackTab);
        assert_eq!(app.focus(), Focus::Compose(FormField::Platforms));

        press(&mut app, &[], KeyCode::Left);
        assert_eq!(app.platform_cursor(), Platform::Linkedin);
        press(&mut app, &[], KeyCode::Char(' '));
        press(&mut app, &[], KeyCode::Char('3'));
        press(&mut app, &[], KeyCode::Char(' '));

        assert_eq!(app.form.platforms(), &[Platform::Linkedin]);
        assert_eq!(app.platform_cursor(), Platform::Instagram);
    }

    #[test]
    fn oversized_image_path_is_rejected_with_a_toast() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("huge.png");
        std::fs::File::create(&path)
            .unwrap()
            .set_len(6 * 1024 * 1024)
            .unwrap();

        let mut app = App::new(Duration::from_secs(3));
        press(&mut app, &[], KeyCode::Char('n'));
        press(&mut app, &[], KeyCode::Tab);
        press(&mut app, &[], KeyCode::Tab);
        type_text(&mut app, path.to_str().unwrap());
        press(&mut app, &[], KeyCode::Enter);

        assert!(app.form.image().is_none());
        assert_eq!(app.toast().map(|t| t.title.as_str()), Some("File too large"));
    }

    #[test]
    fn content_enter_inserts_a_newline() {
        let mut app = App::new(Duration::from_secs(3));
        press(&mut app, &[], KeyCode::Tab);
        press(&mut app, &[], KeyCode::Tab);
        type_text(&mut app, "a");
        press(&mut app, &[], KeyCode::Enter);
        type_text(&mut app, "b");
        press(&mut app, &[], KeyCode::Backspace);
        assert_eq!(app.form.text(TextField::Content), "a\n");
    }

    #[test]
    fn toast_expires_after_its_duration() {
        let mut app = App::new(Duration::from_millis(100));
        app.notify(ToastKind::Error, "Title required", "Please enter a post title");

        app.tick(Instant::now());
        assert!(app.toast().is_some());

        app.tick(Instant::now() + Duration::from_millis(150));
        assert!(app.toast().is_none());
    }

    #[test]
    fn quit_keys() {
        let mut app = App::new(Duration::from_secs(3));
        assert!(matches!(press(&mut app, &[], KeyCode::Char('q')), Some(Action::Quit)));

        press(&mut app, &[], KeyCode::Char('n'));
        assert!(press(&mut app, &[], KeyCode::Char('q')).is_none());
        assert_eq!(app.form.text(TextField::Title), "q");
        assert!(matches!(ctrl(&mut app, 'c'), Some(Action::Quit)));
    }

    #[test]
    fn altgr_characters_are_typed_not_treated_as_shortcuts() {
        let mut app = App::new(Duration::from_secs(3));
        press(&mut app, &[], KeyCode::Char('n'));
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
        for c in ['@', '{', '\\', 's'] {
            assert!(app.handle_key(KeyEvent::new(KeyCode::Char(c), altgr), &[]).is_none());
        }
        assert_eq!(app.form.text(TextField::Title), "@{\\s");
        assert!(app.toast().is_none());
    }
}
