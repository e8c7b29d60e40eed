use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::app::App;
use crate::tui::AppEvent;

const WHEEL_LINES: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
        AppEvent::Response(response) => app.receive(response),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    let page = app.chat_height.max(1);
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => {
            app.submit();
        }
        KeyCode::Backspace => app.delete_before_cursor(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left => app.move_left(),
        KeyCode::Right => app.move_right(),
        KeyCode::Home => app.move_home(),
        KeyCode::End => app.move_end(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(page),
        KeyCode::PageDown => app.scroll_down(page),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_LINES),
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codechat_core::{ChatRequest, ChatResponse};
    use tokio::sync::mpsc;

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    #[test]
    fn typing_and_enter_sends_an_ask() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new("model", tx);

        for c in "why?".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(rx.try_recv().unwrap(), ChatRequest::ask("why?", Some(1)));
        assert!(app.assistant_typing);

        handle_event(
            &mut app,
            AppEvent::Response(ChatResponse::answer("because".to_string(), Some(1))),
        );
        assert!(!app.assistant_typing);
    }

    #[test]
    fn ctrl_c_and_esc_quit() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new("model", tx);
        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.should_quit);
        assert!(app.input.is_empty());

        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new("model", tx);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }
}
