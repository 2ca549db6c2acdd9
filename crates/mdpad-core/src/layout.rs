use std::sync::LazyLock;

use regex::Regex;

pub const MIN_SPLIT_RATIO: f64 = 20.0;
pub const MAX_SPLIT_RATIO: f64 = 80.0;
pub const DEFAULT_SPLIT_RATIO: f64 = 50.0;

static MOBILE_AGENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini")
        .expect("static mobile pattern")
});
static TABLET_AGENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)iPad|Android").expect("static tablet pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Width thresholds in whatever unit the host measures its viewport in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoints {
    /// Below this the single-pane layout is used.
    pub mobile: u32,
    /// Below this toolbar actions collapse into the slide-out menu.
    pub compact_menu: u32,
    /// Upper bound of the tablet band that starts at `mobile`.
    pub tablet: u32,
}

impl Breakpoints {
    /// Pixel thresholds of the browser build.
    pub const fn browser() -> Self {
        Self {
            mobile: 768,
            compact_menu: 1450,
            tablet: 1024,
        }
    }

    /// Cell thresholds for a terminal host.
    pub const fn terminal() -> Self {
        Self {
            mobile: 80,
            compact_menu: 120,
            tablet: 100,
        }
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::browser()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

/// Capability detection strategy deciding whether the single-pane layout
/// should be used.
pub trait DeviceProbe {
    fn is_mobile(&self, viewport: Viewport, breakpoints: &Breakpoints) -> bool;
}

/// Width-only detection.
#[derive(Debug, Default, Clone, Copy)]
pub struct ViewportProbe;

impl DeviceProbe for ViewportProbe {
    fn is_mobile(&self, viewport: Viewport, breakpoints: &Breakpoints) -> bool {
        viewport.width < breakpoints.mobile
    }
}

/// User-agent pattern match, or a narrow viewport.
#[derive(Debug, Clone)]
pub struct UserAgentProbe {
    user_agent: String,
}

impl UserAgentProbe {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    pub fn matches_mobile_agent(&self) -> bool {
        MOBILE_AGENT.is_match(&self.user_agent)
    }

    /// iPad, or any Android token with no "Mobile" after it on its line.
    fn matches_tablet_agent(&self) -> bool {
        TABLET_AGENT.find_iter(&self.user_agent).any(|found| {
            if found.as_str().eq_ignore_ascii_case("ipad") {
                return true;
            }
            let rest = &self.user_agent[found.end()..];
            let line = rest.split('\n').next().unwrap_or(rest);
            !line.to_ascii_lowercase().contains("mobile")
        })
    }

    pub fn classify(&self, viewport: Viewport, breakpoints: &Breakpoints) -> DeviceClass {
        if self.is_mobile(viewport, breakpoints) {
            return DeviceClass::Mobile;
        }
        let medium = viewport.width >= breakpoints.mobile && viewport.width < breakpoints.tablet;
        if self.matches_tablet_agent() || medium {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }
}

impl DeviceProbe for UserAgentProbe {
    fn is_mobile(&self, viewport: Viewport, breakpoints: &Breakpoints) -> bool {
        self.matches_mobile_agent() || viewport.width < breakpoints.mobile
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutState {
    pub is_mobile: bool,
    pub use_compact_menu: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// Horizontal extent of the pane container, in viewport units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSpan {
    pub left: f64,
    pub width: f64,
}

pub struct LayoutController {
    breakpoints: Breakpoints,
    probe: Box<dyn DeviceProbe>,
    viewport: Viewport,
    state: LayoutState,
    split_ratio: f64,
    drag: DragState,
}

impl LayoutController {
    /// Evaluates the layout once for the startup viewport.
    pub fn new(probe: Box<dyn DeviceProbe>, breakpoints: Breakpoints, viewport: Viewport) -> Self {
        let mut controller = Self {
            breakpoints,
            probe,
            viewport,
            state: LayoutState::default(),
            split_ratio: DEFAULT_SPLIT_RATIO,
            drag: DragState::Idle,
        };
        controller.on_resize(viewport);
        controller
    }

    pub fn on_resize(&mut self, viewport: Viewport) -> LayoutState {
        self.viewport = viewport;
        self.state = LayoutState {
            is_mobile: self.probe.is_mobile(viewport, &self.breakpoints),
            use_compact_menu: viewport.width < self.breakpoints.compact_menu,
        };
        self.state
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    pub fn split_ratio(&self) -> f64 {
        self.split_ratio
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag == DragState::Dragging
    }

    /// Pointer went down on the divider. Ignored in the single-pane layout.
    pub fn begin_drag(&mut self) -> bool {
        if self.state.is_mobile {
            return false;
        }
        self.drag = DragState::Dragging;
        true
    }

    /// Projects `pointer_x` onto `container`. Returns whether the ratio
    /// moved; projections outside the allowed band are dropped.
    pub fn drag_to(&mut self, pointer_x: f64, container: ContainerSpan) -> bool {
        if self.drag != DragState::Dragging || container.width <= 0.0 {
            return false;
        }
        let ratio = (pointer_x - container.left) * 100.0 / container.width;
        if !(MIN_SPLIT_RATIO..=MAX_SPLIT_RATIO).contains(&ratio) {
            return false;
        }
        self.split_ratio = ratio;
        true
    }

    pub fn end_drag(&mut self) {
        self.drag = DragState::Idle;
    }
}
