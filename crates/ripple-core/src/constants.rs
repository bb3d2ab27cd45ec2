// Shared tuning constants for the ripple effect used by both web and native frontends.

// Wave solver defaults
pub const DEFAULT_WAVE_SPEED: f32 = 0.5; // cells per step
pub const DEFAULT_SPRING_STRENGTH: f32 = 0.004; // restoring pull toward rest
pub const DEFAULT_VELOCITY_DAMPING: f32 = 0.985;
pub const DEFAULT_HEIGHT_DAMPING: f32 = 0.995;
pub const DEFAULT_TIME_STEP: f32 = 1.0; // fixed integration step per frame

// Pointer forcing
pub const DEFAULT_RIPPLE_RADIUS: f32 = 0.05; // in units of surface height
pub const DEFAULT_RIPPLE_STRENGTH: f32 = 3.0;
pub const DEFAULT_RIPPLE_FALLOFF: f32 = 2.0; // smoothing power on (1 - d/r)
pub const POINTER_SPEED_EPSILON: f32 = 1e-4; // below this a pointer counts as stationary
pub const POINTER_SPEED_MAX: f32 = 0.25; // uv units per step

// Compositing
pub const DEFAULT_DISTORTION_STRENGTH: f32 = 0.35;
pub const DEFAULT_CHROMA_STRENGTH: f32 = 0.006;
pub const DEFAULT_CHROMA_DISPERSAL: f32 = 0.6;
pub const DEFAULT_GLINT_STRENGTH: f32 = 0.35;
pub const DEFAULT_GLINT_SHININESS: f32 = 48.0;
pub const DEFAULT_CAUSTICS_STRENGTH: f32 = 0.06;
pub const DEFAULT_CAUSTICS_SCALE: f32 = 9.0;
pub const DEFAULT_REST_THRESHOLD: f32 = 1e-3;
pub const DEFAULT_RESOLUTION_SCALE: f32 = 0.5;

// Rest mask reaches full strength at this multiple of the rest threshold
pub const REST_MASK_SPAN: f32 = 4.0;

// Surface normal exaggeration for the glint term
pub const NORMAL_SCALE: f32 = 8.0;

// Fixed light direction for the glint term (normalised at use)
pub const LIGHT_DIR: [f32; 3] = [-0.35, -0.45, 0.82];

// Caustics drift in uv per second, per octave multiplier applied on top
pub const CAUSTICS_DRIFT: [f32; 2] = [0.05, -0.07];
pub const CAUSTICS_OCTAVES: u32 = 3;

// Explicit integrator stability: (8 c^2 + k) dt^2 must stay below this
pub const COURANT_LIMIT: f32 = 4.0;

// Largest simulation grid edge we will allocate
pub const MAX_GRID_EDGE: u32 = 4096;
