//! Placement of the results panel relative to the search input.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayRect {
  pub x:      u16,
  pub y:      u16,
  pub width:  u16,
  pub height: u16,
}

impl OverlayRect {
  pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
    Self {
      x,
      y,
      width,
      height,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.width == 0 || self.height == 0
  }

  pub fn right(&self) -> u16 {
    self.x.saturating_add(self.width)
  }

  pub fn bottom(&self) -> u16 {
    self.y.saturating_add(self.height)
  }

  pub fn contains(&self, column: u16, row: u16) -> bool {
    column >= self.x && column < self.right() && row >= self.y && row < self.bottom()
  }

  /// Smallest rect covering both. Empty rects don't contribute.
  pub fn union(self, other: Self) -> Self {
    if self.is_empty() {
      return other;
    }
    if other.is_empty() {
      return self;
    }
    let x = self.x.min(other.x);
    let y = self.y.min(other.y);
    let right = self.right().max(other.right());
    let bottom = self.bottom().max(other.bottom());
    Self::new(x, y, right - x, bottom - y)
  }
}

/// Rect for a results panel of `panel_height` rows (borders included)
/// anchored to `input`. Prefers the space below the input, flips above when
/// that fits better, and never leaves `area`.
pub fn results_panel_rect(area: OverlayRect, input: OverlayRect, panel_height: u16) -> OverlayRect {
  let width = input.width.min(area.width).max(1);
  let max_x = area.x + area.width.saturating_sub(width);
  let x = input.x.clamp(area.x, max_x.max(area.x));
  let desired_height = panel_height.max(1);

  let below_start = input.bottom().max(area.y);
  let below_space = area.bottom().saturating_sub(below_start);
  let above_space = input.y.saturating_sub(area.y);
  let place_below = if below_space >= desired_height {
    true
  } else if above_space >= desired_height {
    false
  } else {
    below_space >= above_space
  };

  if place_below {
    let height = desired_height.min(below_space.max(1));
    OverlayRect::new(x, below_start, width, height)
  } else {
    let height = desired_height.min(above_space.max(1));
    OverlayRect::new(x, input.y.saturating_sub(height), width, height)
  }
}
