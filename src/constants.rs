// Tuning constants for selection, spatial queries and order handling

// Control groups
pub const CONTROL_GROUP_COUNT: usize = 10;

// Ground plane (walkable surface) height in world units
pub const GROUND_HEIGHT: f32 = -1.0;

// Spatial query settings
pub const RAY_MAX_DISTANCE: f32 = 5_000.0;          // Hits beyond this are ignored
pub const WORLD_TRACE_HEIGHT: f32 = 1_000.0;        // Height the world-position trace starts from
pub const RAY_PARALLEL_EPSILON: f32 = 0.0001;       // Below this the ray counts as parallel to the ground
pub const DEFAULT_UNIT_RADIUS: f32 = 1.5;           // Collider radius for units spawned without an explicit one

// Selection system settings
pub const BOX_SELECT_DRAG_THRESHOLD: f32 = 8.0;     // Pixels before a drag counts as a box select

// Order link settings
pub const PENDING_ORDER_TIMEOUT_TICKS: u64 = 8;     // Unconfirmed orders older than this are presumed rejected

// Default viewport (camera collaborator) settings
pub const DEFAULT_SCREEN_WIDTH: f32 = 1280.0;
pub const DEFAULT_SCREEN_HEIGHT: f32 = 720.0;
pub const DEFAULT_VERTICAL_FOV: f32 = std::f32::consts::FRAC_PI_4;
pub const DEFAULT_CAMERA_HEIGHT: f32 = 120.0;
pub const DEFAULT_CAMERA_DISTANCE: f32 = 120.0;
