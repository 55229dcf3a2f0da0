use the_directory_search::Navigator;

/// Where the application currently is. Selecting a search result moves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
  location: String,
  history:  Vec<String>,
}

impl Router {
  pub fn new(start: impl Into<String>) -> Self {
    Self {
      location: start.into(),
      history:  Vec::new(),
    }
  }

  pub fn location(&self) -> &str {
    &self.location
  }

  /// Earlier locations, oldest first.
  pub fn history(&self) -> &[String] {
    &self.history
  }

  pub fn back(&mut self) -> bool {
    match self.history.pop() {
      Some(previous) => {
        log::info!("back to {previous}");
        self.location = previous;
        true
      },
      None => false,
    }
  }
}

impl Default for Router {
  fn default() -> Self {
    Self::new("/")
  }
}

impl Navigator for Router {
  fn navigate(&mut self, url: &str) {
    log::info!("navigate {} -> {url}", self.location);
    let previous = std::mem::replace(&mut self.location, url.to_string());
    self.history.push(previous);
  }
}
