//! Shared constants and invariants

// Environment variables holding provider credentials
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_TDX_CLIENT_ID: &str = "TDX_CLIENT_ID";
pub const ENV_TDX_CLIENT_SECRET: &str = "TDX_CLIENT_SECRET";

// Token lifecycle defaults
pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 60;
pub const DEFAULT_MIN_REFRESH_SECS: u64 = 30;
pub const DEFAULT_FAILURE_RETRY_SECS: u64 = 30;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

// Nearby search defaults
pub const DEFAULT_RADIUS_METERS: u32 = 500;
pub const DEFAULT_PLACE_TYPE: &str = "bus_stop";

// Default upstream endpoints
pub const DEFAULT_TRANSIT_BASE_URL: &str = "https://tdx.transportdata.tw/api/advanced";
pub const DEFAULT_TRANSIT_TOKEN_URL: &str =
    "https://tdx.transportdata.tw/auth/realms/TDXConnect/protocol/openid-connect/token";
pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com";

pub const TRANSIT_NEARBY_PATH: &str = "/v2/Bus/Stop/NearBy";
pub const PLACES_NEARBY_PATH: &str = "/maps/api/place/nearbysearch/json";

// Inbound routes
pub const ROUTE_ROOT: &str = "/";
pub const ROUTE_ITEMS: &str = "/items/{item_id}";
pub const ROUTE_NEARBY_BUS_STOPS: &str = "/nearby-bus-stops";
pub const ROUTE_BUS_STOPS: &str = "/bus-stops";
pub const GATEWAY_ROUTES: [&str; 4] = [ROUTE_ROOT, ROUTE_ITEMS, ROUTE_NEARBY_BUS_STOPS, ROUTE_BUS_STOPS];
