//! Rendering - draws the search input, the results overlay, the location
//! pane and the login modal, and records the hit areas for the next click.

use eyre::Result;
use ratatui::{
  Frame,
  layout::{
    Constraint,
    Layout,
    Rect,
  },
  style::{
    Color,
    Modifier,
    Style,
  },
  text::{
    Line,
    Span,
  },
  widgets::{
    Block,
    Borders,
    Clear,
    List,
    ListItem,
    ListState,
    Paragraph,
  },
};
use the_directory_search::{
  OverlayRect,
  PanelState,
  SearchResult,
  icon_for_kind,
  layout::results_panel_rect,
};

use unicode_width::UnicodeWidthStr;

use crate::{
  Ctx,
  ctx::HitAreas,
  terminal::Terminal,
};

const MAX_VISIBLE_ROWS: u16 = 10;
const LOGIN_WIDTH: u16 = 44;
const LOGIN_HEIGHT: u16 = 7;

pub fn render(ctx: &mut Ctx, terminal: &mut Terminal) -> Result<()> {
  terminal.draw(|frame| draw(frame, ctx))
}

fn draw(frame: &mut Frame, ctx: &mut Ctx) {
  let area = frame.area();
  let [input_area, body_area, hints_area] = Layout::vertical([
    Constraint::Length(3),
    Constraint::Min(0),
    Constraint::Length(1),
  ])
  .areas(area);

  draw_location(frame, ctx, body_area);
  draw_hints(frame, hints_area);
  draw_input(frame, ctx, input_area);

  let mut hit = HitAreas {
    input: to_overlay(input_area),
    ..HitAreas::default()
  };
  let mut root = hit.input;
  if ctx.search.session().is_open() {
    let panel = draw_panel(frame, ctx, area, input_area, &mut hit);
    root = root.union(panel);
  }
  ctx.search.root().set(root);
  ctx.hit = hit;

  if ctx.login.is_open() {
    draw_login(frame, ctx, area);
  }
}

fn draw_input(frame: &mut Frame, ctx: &Ctx, area: Rect) {
  let focused = ctx.search.is_focused() && !ctx.login.is_open();
  let border = if focused {
    Style::default().fg(Color::Cyan)
  } else {
    Style::default().fg(Color::DarkGray)
  };
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(border)
    .title(" Search ");
  let inner = block.inner(area);
  let input = ctx.search.session().raw_input();
  frame.render_widget(Paragraph::new(input).block(block), area);

  if focused && inner.width > 0 {
    let width = u16::try_from(input.width()).unwrap_or(u16::MAX);
    let x = inner.x.saturating_add(width).min(inner.right().saturating_sub(1));
    frame.set_cursor_position((x, inner.y));
  }
}

/// Draws the overlay and returns the rect it occupies.
fn draw_panel(
  frame: &mut Frame,
  ctx: &Ctx,
  area: Rect,
  input_area: Rect,
  hit: &mut HitAreas,
) -> OverlayRect {
  let session = ctx.search.session();
  let rows = match ctx.search.panel_state() {
    PanelState::OpenResults => session.results().len(),
    _ => 0,
  };
  let list_height = u16::try_from(rows).unwrap_or(u16::MAX).min(MAX_VISIBLE_ROWS);
  // status line + rows + borders
  let panel_height = list_height + 3;
  let panel = results_panel_rect(to_overlay(area), to_overlay(input_area), panel_height);
  let panel_area = to_rect(panel);

  frame.render_widget(Clear, panel_area);
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(panel_area);
  frame.render_widget(block, panel_area);
  if inner.height == 0 {
    return panel;
  }

  let [status_area, list_area] =
    Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
  let status = Paragraph::new(ctx.search.status_line().to_string())
    .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC));
  frame.render_widget(status, status_area);

  if rows > 0 && list_area.height > 0 {
    let items: Vec<ListItem> = session.results().iter().map(result_item).collect();
    let list = List::new(items).highlight_style(
      Style::default()
        .bg(Color::Cyan)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default().with_selected(session.selected());
    frame.render_stateful_widget(list, list_area, &mut state);

    hit.rows = to_overlay(list_area);
    hit.first_row = state.offset();
  }

  panel
}

fn result_item(result: &SearchResult) -> ListItem<'static> {
  let icon = icon_for_kind(&result.kind);
  let mut spans = vec![
    Span::raw(format!(" {} ", icon.glyph)),
    Span::styled(
      result.name.clone(),
      Style::default().add_modifier(Modifier::BOLD),
    ),
    Span::styled(
      format!("  {}", result.kind.label()),
      Style::default().fg(Color::DarkGray),
    ),
  ];
  if let Some(parent) = &result.parent_name {
    spans.push(Span::styled(
      format!(" · {parent}"),
      Style::default().fg(Color::DarkGray),
    ));
  }
  ListItem::new(Line::from(spans))
}

fn draw_location(frame: &mut Frame, ctx: &Ctx, area: Rect) {
  let router = &ctx.router;
  let mut lines = vec![Line::from(vec![
    Span::styled("Location: ", Style::default().fg(Color::DarkGray)),
    Span::styled(
      router.location().to_string(),
      Style::default().add_modifier(Modifier::BOLD),
    ),
  ])];
  if !router.history().is_empty() {
    lines.push(Line::default());
    lines.push(Line::styled(
      "History",
      Style::default().fg(Color::DarkGray),
    ));
    for entry in router.history().iter().rev() {
      lines.push(Line::raw(format!("  {entry}")));
    }
  }
  let block = Block::default().borders(Borders::ALL).title(" Directory ");
  frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_hints(frame: &mut Frame, area: Rect) {
  let hints = " ↑/↓ select · Enter open · Esc close · ^U clear · ^O back · ^L login · ^C quit";
  frame.render_widget(
    Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
    area,
  );
}

fn draw_login(frame: &mut Frame, ctx: &Ctx, area: Rect) {
  let width = LOGIN_WIDTH.min(area.width);
  let height = LOGIN_HEIGHT.min(area.height);
  let modal = Rect::new(
    area.x + (area.width - width) / 2,
    area.y + (area.height - height) / 2,
    width,
    height,
  );
  ctx.login.root().set(to_overlay(modal));

  let return_to = ctx
    .login
    .request()
    .map(|request| request.return_to.as_str())
    .unwrap_or("/");
  let lines = vec![
    Line::raw(""),
    Line::raw("  Sign in to continue."),
    Line::styled(
      format!("  Returning to {return_to}"),
      Style::default().fg(Color::DarkGray),
    ),
    Line::raw(""),
    Line::styled(
      "  Enter confirm · Esc cancel",
      Style::default().fg(Color::DarkGray),
    ),
  ];
  frame.render_widget(Clear, modal);
  frame.render_widget(
    Paragraph::new(lines).block(
      Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Login "),
    ),
    modal,
  );
}

fn to_overlay(rect: Rect) -> OverlayRect {
  OverlayRect::new(rect.x, rect.y, rect.width, rect.height)
}

fn to_rect(rect: OverlayRect) -> Rect {
  Rect::new(rect.x, rect.y, rect.width, rect.height)
}
