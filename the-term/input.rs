//! Input handling - maps crossterm events onto the search box, the login
//! modal and the platform listener registry.

use crossterm::event::{
  KeyCode,
  KeyEvent,
  KeyEventKind,
  KeyModifiers,
  MouseButton,
  MouseEvent,
  MouseEventKind,
};
use the_directory_search::{
  Key,
  PlatformEvent,
};

use crate::Ctx;

pub fn handle_key(ctx: &mut Ctx, event: KeyEvent) {
  if event.kind == KeyEventKind::Release {
    return;
  }

  if event.modifiers.contains(KeyModifiers::CONTROL) {
    match event.code {
      KeyCode::Char('c') => ctx.should_quit = true,
      KeyCode::Char('l') => ctx.request_login(),
      KeyCode::Char('u') => {
        ctx.search.clear();
        ctx.needs_render = true;
      },
      KeyCode::Char('o') => {
        ctx.needs_render |= ctx.router.back();
      },
      _ => {},
    }
    return;
  }

  let key = to_key(event.code);
  ctx.listeners.dispatch(&PlatformEvent::KeyDown(key));

  if ctx.login.is_open() {
    ctx.login.handle_key(key);
  } else {
    let Ctx { search, router, .. } = ctx;
    search.handle_key(key, router);
  }
  ctx.needs_render = true;
}

pub fn handle_mouse(ctx: &mut Ctx, event: MouseEvent) {
  let MouseEventKind::Down(MouseButton::Left) = event.kind else {
    return;
  };
  let (column, row) = (event.column, event.row);
  ctx.listeners.dispatch(&PlatformEvent::PointerDown { column, row });

  if !ctx.login.is_open() {
    if let Some(index) = ctx.hit.row_at(column, row) {
      let Ctx { search, router, .. } = ctx;
      search.select(index, router);
    } else if ctx.hit.input.contains(column, row) {
      ctx.search.focus();
    } else {
      ctx.search.blur();
    }
  }
  ctx.needs_render = true;
}

pub fn to_key(code: KeyCode) -> Key {
  match code {
    KeyCode::Char(c) => Key::Char(c),
    KeyCode::Enter => Key::Enter,
    KeyCode::Esc => Key::Escape,
    KeyCode::Backspace => Key::Backspace,
    KeyCode::Up => Key::Up,
    KeyCode::Down => Key::Down,
    _ => Key::Other,
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::Arc,
    time::Duration,
  };

  use async_trait::async_trait;
  use the_directory_loader::config::Config;
  use the_directory_search::{
    EntityKind,
    OverlayRect,
    PanelState,
    SearchBackend,
    SearchError,
    SearchResult,
  };

  use super::*;

  struct Fixed;

  #[async_trait]
  impl SearchBackend for Fixed {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
      Ok(vec![
        SearchResult::new(EntityKind::Squad, "1", format!("{query} squad"), "/squads/1"),
        SearchResult::new(EntityKind::Person, "2", format!("{query} person"), "/people/2"),
      ])
    }
  }

  struct Slow;

  #[async_trait]
  impl SearchBackend for Slow {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
      tokio::time::sleep(Duration::from_millis(200)).await;
      Fixed.search(query).await
    }
  }

  fn ctx() -> Ctx {
    Ctx::new(Arc::new(Fixed), &Config::default())
  }

  fn press(ctx: &mut Ctx, code: KeyCode) {
    handle_key(ctx, KeyEvent::new(code, KeyModifiers::NONE));
  }

  fn ctrl(ctx: &mut Ctx, ch: char) {
    handle_key(ctx, KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL));
  }

  fn click(ctx: &mut Ctx, column: u16, row: u16) {
    handle_mouse(ctx, MouseEvent {
      kind: MouseEventKind::Down(MouseButton::Left),
      column,
      row,
      modifiers: KeyModifiers::NONE,
    });
  }

  async fn settle(ctx: &mut Ctx) {
    for _ in 0..40 {
      tokio::time::sleep(Duration::from_millis(10)).await;
      ctx.tick();
    }
  }

  async fn type_query(ctx: &mut Ctx, query: &str) {
    for ch in query.chars() {
      press(ctx, KeyCode::Char(ch));
    }
    settle(ctx).await;
    assert_eq!(ctx.search.panel_state(), PanelState::OpenResults);
  }

  #[tokio::test(start_paused = true)]
  async fn clicking_a_row_navigates_there() {
    let mut ctx = ctx();
    type_query(&mut ctx, "pay").await;

    ctx.search.root().set(OverlayRect::new(0, 0, 40, 8));
    ctx.hit.rows = OverlayRect::new(1, 4, 38, 2);
    click(&mut ctx, 5, 5);
    ctx.tick();

    assert_eq!(ctx.router.location(), "/people/2");
    assert_eq!(ctx.search.panel_state(), PanelState::Closed);
    assert_eq!(ctx.search.session().raw_input(), "");
  }

  #[tokio::test(start_paused = true)]
  async fn arrow_and_enter_open_highlighted_row() {
    let mut ctx = ctx();
    type_query(&mut ctx, "pay").await;

    press(&mut ctx, KeyCode::Down);
    press(&mut ctx, KeyCode::Enter);
    assert_eq!(ctx.router.location(), "/people/2");
    assert_eq!(ctx.router.history(), ["/"]);
  }

  #[tokio::test(start_paused = true)]
  async fn escape_and_outside_click_close_the_panel() {
    let mut ctx = ctx();
    type_query(&mut ctx, "pay").await;
    press(&mut ctx, KeyCode::Esc);
    ctx.tick();
    assert_eq!(ctx.search.panel_state(), PanelState::Closed);

    ctx.search.root().set(OverlayRect::new(0, 0, 40, 8));
    ctx.hit.input = OverlayRect::new(0, 0, 40, 3);
    click(&mut ctx, 1, 1);
    ctx.tick();
    assert_eq!(ctx.search.panel_state(), PanelState::OpenResults);

    click(&mut ctx, 60, 20);
    ctx.tick();
    assert_eq!(ctx.search.panel_state(), PanelState::Closed);
    assert_eq!(ctx.search.session().results().len(), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn login_modal_captures_keys_until_dismissed() {
    let mut ctx = ctx();
    type_query(&mut ctx, "pay").await;

    ctrl(&mut ctx, 'l');
    ctx.tick();
    assert!(ctx.login.is_open());
    assert_eq!(ctx.search.panel_state(), PanelState::Closed);

    press(&mut ctx, KeyCode::Char('x'));
    assert_eq!(ctx.search.session().raw_input(), "pay");

    press(&mut ctx, KeyCode::Esc);
    ctx.tick();
    assert!(!ctx.login.is_open());
    assert!(ctx.listeners.is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn late_response_stays_behind_login_modal() {
    let mut ctx = Ctx::new(Arc::new(Slow), &Config::default());
    for ch in "pay".chars() {
      press(&mut ctx, KeyCode::Char(ch));
    }
    for _ in 0..35 {
      tokio::time::sleep(Duration::from_millis(10)).await;
      ctx.tick();
    }
    assert_eq!(ctx.search.panel_state(), PanelState::OpenLoading);

    ctrl(&mut ctx, 'l');
    ctx.tick();
    assert!(ctx.login.is_open());

    settle(&mut ctx).await;
    assert_eq!(ctx.search.panel_state(), PanelState::Closed);
    assert_eq!(ctx.listeners.len(), 2);

    press(&mut ctx, KeyCode::Esc);
    ctx.tick();
    assert!(!ctx.login.is_open());
    assert!(ctx.listeners.is_empty());
  }

  #[test]
  fn ctrl_c_quits_and_ctrl_u_clears() {
    let mut ctx = ctx();
    press(&mut ctx, KeyCode::Char('a'));
    ctrl(&mut ctx, 'u');
    assert_eq!(ctx.search.session().raw_input(), "");
    ctrl(&mut ctx, 'c');
    assert!(ctx.should_quit);
  }
}
