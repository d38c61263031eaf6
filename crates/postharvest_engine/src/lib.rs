//! Postharvest engine: snapshot extraction, session driving, harvest loop.
mod cookies;
mod extract;
mod harvest;
mod numeric;
mod persist;
mod session;
mod webdriver;

pub use cookies::{load_cookie_file, parse_cookie_lines, CookieFileError};
pub use extract::{SnapshotExtractor, FEED_ORIGIN};
pub use harvest::{harvest_posts, HarvestError, HarvestSettings, LOGIN_LANDMARK};
pub use numeric::abbreviated_count;
pub use persist::{write_posts_json, PersistError};
pub use session::{BrowserSession, SessionCookie, SessionError};
pub use webdriver::{WebDriverConfig, WebDriverSession};
