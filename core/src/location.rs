use crate::error::LocationError;
use crate::models::Location;

/// One way of learning where the device is, e.g. GPS or network.
pub trait LocationSource {
    fn name(&self) -> &str;
    fn last_known(&self) -> Result<Option<Location>, LocationError>;
}

/// Best-effort location for a new workout. Never fails.
pub trait Locator {
    fn locate(&self) -> Option<Location>;
}

/// Never knows where it is.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLocation;

impl Locator for NoLocation {
    fn locate(&self) -> Option<Location> {
        None
    }
}

/// A fixed location.
#[derive(Clone, Copy, Debug)]
pub struct FixedLocation(pub Location);

impl Locator for FixedLocation {
    fn locate(&self) -> Option<Location> {
        Some(self.0)
    }
}

/// Picks the most accurate last known location among all sources.
#[derive(Default)]
pub struct ProviderLocator {
    sources: Vec<Box<dyn LocationSource>>,
}

impl ProviderLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Box<dyn LocationSource>) -> Self {
        self.sources.push(source);
        self
    }
}

impl Locator for ProviderLocator {
    fn locate(&self) -> Option<Location> {
        let mut best: Option<Location> = None;
        for source in &self.sources {
            let location = match source.last_known() {
                Ok(Some(location)) => location,
                Ok(None) => continue,
                Err(err) => {
                    log::debug!("location source {} skipped: {}", source.name(), err);
                    continue;
                }
            };
            if best.map_or(true, |b| location.accuracy_m < b.accuracy_m) {
                best = Some(location);
            }
        }
        best
    }
}
