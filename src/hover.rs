//! Hover affordance for the primary photo
//!
//! ## Table of Contents
//! - **ease**: Easing curves
//! - **ScaleTween**: One scale interpolation
//! - **HoverAnimation**: Scale 1.0 <-> 1.1 on pointer enter / leave
//! - **ListenerRegistry / ListenerGuard**: Scoped pointer listeners
//! - **HoverEffect**: Binds the animation to whichever primary image is shown

use crate::view::ImageView;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Easing
// ============================================================================

/// Easing style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EasingStyle {
    /// Constant speed
    Linear,
    /// Quadratic
    #[default]
    Quad,
    /// Cubic
    Cubic,
    /// Sinusoidal
    Sine,
}

/// Easing direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EasingDirection {
    /// Accelerate
    In,
    /// Decelerate
    Out,
    /// Accelerate then decelerate
    #[default]
    InOut,
}

/// Eased progress for `t` in `[0, 1]`
pub fn ease(t: f32, style: EasingStyle, direction: EasingDirection) -> f32 {
    let t = t.clamp(0.0, 1.0);

    match direction {
        EasingDirection::In => ease_in(t, style),
        EasingDirection::Out => 1.0 - ease_in(1.0 - t, style),
        EasingDirection::InOut => {
            if t < 0.5 {
                ease_in(t * 2.0, style) / 2.0
            } else {
                1.0 - ease_in((1.0 - t) * 2.0, style) / 2.0
            }
        }
    }
}

fn ease_in(t: f32, style: EasingStyle) -> f32 {
    match style {
        EasingStyle::Linear => t,
        EasingStyle::Quad => t * t,
        EasingStyle::Cubic => t * t * t,
        EasingStyle::Sine => 1.0 - (t * std::f32::consts::FRAC_PI_2).cos(),
    }
}

// ============================================================================
// Tween
// ============================================================================

/// Tween configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenInfo {
    /// Duration in seconds
    pub duration: f32,
    /// Easing style
    pub easing_style: EasingStyle,
    /// Easing direction
    pub easing_direction: EasingDirection,
}

impl Default for TweenInfo {
    /// 0.3 s quadratic in-out
    fn default() -> Self {
        Self {
            duration: 0.3,
            easing_style: EasingStyle::Quad,
            easing_direction: EasingDirection::InOut,
        }
    }
}

/// A running scale interpolation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleTween {
    from: f32,
    to: f32,
    elapsed: f32,
    info: TweenInfo,
}

impl ScaleTween {
    /// Start a tween from `from` to `to`
    pub fn new(from: f32, to: f32, info: TweenInfo) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            info,
        }
    }

    /// Advance by `dt` seconds and return the current value
    pub fn tick(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.info.duration);
        self.value()
    }

    /// Current value
    pub fn value(&self) -> f32 {
        if self.info.duration <= 0.0 {
            return self.to;
        }
        let t = ease(
            self.elapsed / self.info.duration,
            self.info.easing_style,
            self.info.easing_direction,
        );
        self.from + (self.to - self.from) * t
    }

    /// True once the target is reached
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.info.duration
    }
}

/// Scale animation driven by pointer enter / leave
#[derive(Clone, Debug, PartialEq)]
pub struct HoverAnimation {
    rest_scale: f32,
    hover_scale: f32,
    info: TweenInfo,
    scale: f32,
    tween: Option<ScaleTween>,
}

impl Default for HoverAnimation {
    fn default() -> Self {
        Self::new(1.0, 1.1, TweenInfo::default())
    }
}

impl HoverAnimation {
    /// Create an animation between `rest_scale` and `hover_scale`
    pub fn new(rest_scale: f32, hover_scale: f32, info: TweenInfo) -> Self {
        Self {
            rest_scale,
            hover_scale,
            info,
            scale: rest_scale,
            tween: None,
        }
    }

    /// Pointer entered the element
    pub fn pointer_enter(&mut self) {
        self.retarget(self.hover_scale);
    }

    /// Pointer left the element
    pub fn pointer_leave(&mut self) {
        self.retarget(self.rest_scale);
    }

    // Retarget from wherever the scale currently is.
    fn retarget(&mut self, to: f32) {
        self.tween = Some(ScaleTween::new(self.scale, to, self.info));
    }

    /// Advance by `dt` seconds and return the scale to apply
    pub fn tick(&mut self, dt: f32) -> f32 {
        if let Some(tween) = self.tween.as_mut() {
            self.scale = tween.tick(dt);
            if tween.is_complete() {
                self.tween = None;
            }
        }
        self.scale
    }

    /// Scale to apply right now
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// True while a tween is running
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Snap back to the rest scale
    pub fn reset(&mut self) {
        self.scale = self.rest_scale;
        self.tween = None;
    }
}

// ============================================================================
// Listeners
// ============================================================================

/// Pointer events the effect reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    /// Pointer entered
    Enter,
    /// Pointer left
    Leave,
}

/// Tracks which elements have pointer listeners attached
#[derive(Clone, Debug, Default)]
pub struct ListenerRegistry {
    listeners: Arc<Mutex<HashMap<u64, Vec<u64>>>>,
    next_id: Arc<AtomicU64>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an enter/leave listener pair to `element`
    ///
    /// The listeners stay attached for as long as the guard lives.
    pub fn attach(&self, element: u64) -> ListenerGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().entry(element).or_default().push(id);
        debug!(element, listener = id, "Pointer listeners attached");
        ListenerGuard {
            registry: self.clone(),
            element,
            id,
        }
    }

    /// Listeners currently attached to `element`
    pub fn listener_count(&self, element: u64) -> usize {
        self.listeners.lock().get(&element).map_or(0, Vec::len)
    }

    /// Listeners attached across all elements
    pub fn total(&self) -> usize {
        self.listeners.lock().values().map(Vec::len).sum()
    }

    fn detach(&self, element: u64, id: u64) {
        let mut listeners = self.listeners.lock();
        if let Some(ids) = listeners.get_mut(&element) {
            ids.retain(|&l| l != id);
            if ids.is_empty() {
                listeners.remove(&element);
            }
        }
        debug!(element, listener = id, "Pointer listeners detached");
    }
}

/// Detaches its listeners on drop
#[derive(Debug)]
pub struct ListenerGuard {
    registry: ListenerRegistry,
    element: u64,
    id: u64,
}

impl ListenerGuard {
    /// Element the listeners are attached to
    pub fn element(&self) -> u64 {
        self.element
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.registry.detach(self.element, self.id);
    }
}

// ============================================================================
// Effect
// ============================================================================

/// Hover effect keyed on the presence of the primary image
#[derive(Debug)]
pub struct HoverEffect {
    registry: ListenerRegistry,
    bound: Option<ListenerGuard>,
    animation: HoverAnimation,
}

impl HoverEffect {
    /// Create an effect that attaches through `registry`
    pub fn new(registry: ListenerRegistry) -> Self {
        Self {
            registry,
            bound: None,
            animation: HoverAnimation::default(),
        }
    }

    /// Reconcile with the image currently shown
    ///
    /// Re-syncing the same image is a no-op; a different image or none
    /// detaches the old listeners first.
    pub fn sync(&mut self, image: Option<&ImageView>) {
        let wanted = image.map(|img| img.id);
        if self.bound.as_ref().map(ListenerGuard::element) == wanted {
            return;
        }

        self.bound = None;
        self.animation.reset();
        if let Some(element) = wanted {
            self.bound = Some(self.registry.attach(element));
        }
    }

    /// Deliver a pointer event; ignored while no image is bound
    pub fn handle(&mut self, event: PointerEvent) {
        if self.bound.is_none() {
            return;
        }
        match event {
            PointerEvent::Enter => self.animation.pointer_enter(),
            PointerEvent::Leave => self.animation.pointer_leave(),
        }
    }

    /// Advance the animation
    pub fn tick(&mut self, dt: f32) -> f32 {
        self.animation.tick(dt)
    }

    /// Current scale
    pub fn scale(&self) -> f32 {
        self.animation.scale()
    }

    /// Element the listeners are attached to
    pub fn bound_element(&self) -> Option<u64> {
        self.bound.as_ref().map(ListenerGuard::element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: u64) -> ImageView {
        ImageView {
            id,
            src: format!("http://x/uploads/{}.png", id),
            alt: "Team member photo".to_string(),
            width: 500,
            height: 500,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_quad_in_out() {
        let s = EasingStyle::Quad;
        let d = EasingDirection::InOut;
        assert!(approx(ease(0.0, s, d), 0.0));
        assert!(approx(ease(0.25, s, d), 0.125));
        assert!(approx(ease(0.5, s, d), 0.5));
        assert!(approx(ease(1.0, s, d), 1.0));
        assert!(approx(ease(2.0, s, d), 1.0));
    }

    #[test]
    fn test_hover_scales_up_and_back() {
        let mut anim = HoverAnimation::default();
        assert!(approx(anim.scale(), 1.0));

        anim.pointer_enter();
        let mid = anim.tick(0.15);
        assert!(approx(mid, 1.05));
        assert!(approx(anim.tick(0.15), 1.1));
        assert!(!anim.is_animating());

        anim.pointer_leave();
        assert!(approx(anim.tick(1.0), 1.0));
    }

    #[test]
    fn test_leave_mid_tween_starts_from_current() {
        let mut anim = HoverAnimation::default();
        anim.pointer_enter();
        let partway = anim.tick(0.15);

        anim.pointer_leave();
        assert!(approx(anim.tick(0.0), partway));
        assert!(approx(anim.tick(0.3), 1.0));
    }

    #[test]
    fn test_sync_same_image_does_not_duplicate() {
        let registry = ListenerRegistry::new();
        let mut effect = HoverEffect::new(registry.clone());

        effect.sync(Some(&image(1)));
        effect.sync(Some(&image(1)));
        effect.sync(Some(&image(1)));

        assert_eq!(registry.listener_count(1), 1);
        assert_eq!(effect.bound_element(), Some(1));
    }

    #[test]
    fn test_sync_replaced_image_moves_listeners() {
        let registry = ListenerRegistry::new();
        let mut effect = HoverEffect::new(registry.clone());

        effect.sync(Some(&image(1)));
        effect.handle(PointerEvent::Enter);
        effect.tick(0.3);
        assert!(approx(effect.scale(), 1.1));

        effect.sync(Some(&image(2)));
        assert_eq!(registry.listener_count(1), 0);
        assert_eq!(registry.listener_count(2), 1);
        assert!(approx(effect.scale(), 1.0));

        effect.sync(None);
        assert_eq!(registry.total(), 0);
    }

    #[test]
    fn test_drop_detaches() {
        let registry = ListenerRegistry::new();
        {
            let mut effect = HoverEffect::new(registry.clone());
            effect.sync(Some(&image(7)));
            assert_eq!(registry.total(), 1);
        }
        assert_eq!(registry.total(), 0);
    }

    #[test]
    fn test_events_ignored_without_image() {
        let mut effect = HoverEffect::new(ListenerRegistry::new());
        effect.handle(PointerEvent::Enter);
        assert!(approx(effect.tick(0.3), 1.0));
    }
}
