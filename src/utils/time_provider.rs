use chrono::{DateTime, Utc};

///
/// An overridable clock - used for tests.
///
/// Production code leaves it unfixed and gets the real time. Tests fix the
/// clock to a known instant so expiry windows and change timestamps can be
/// asserted exactly.
///
#[derive(Debug, Default)]
pub struct TimeProvider {
    fixed: Option<DateTime<Utc>>
}

impl TimeProvider {
    pub fn now(&self) -> DateTime<Utc> {
        match self.fixed {
            Some(fixed) => fixed,
            None => Utc::now()
        }
    }

    pub fn fix(&mut self, fixed: Option<DateTime<Utc>>) {
        self.fixed = fixed;
    }
}
