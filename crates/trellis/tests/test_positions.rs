//! Integration tests for position resolution and invalidation.

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use proptest::prelude::*;
    use trellis::{
        PositionResolver, Result, Scene, Stage, WidgetId, WidgetKind, WidgetTemplate,
        coords::{PaddingBase, PositionBase},
        docking::DockPadding,
        geom::{Face, Orientation, Point, Size},
        viewport::{FixedViewport, ViewportProvider},
    };

    /// A viewport whose size the host window changes between frames.
    #[derive(Clone)]
    struct Window(Rc<Cell<Size>>);

    impl ViewportProvider for Window {
        fn viewport_size(&self) -> Size {
            self.0.get()
        }

        fn viewport_origin(&self) -> Point {
            Point::zero()
        }
    }

    /// A panel at (100, 50) of 200x100, holding one child.
    fn owner_with_child(child: WidgetTemplate) -> WidgetTemplate {
        WidgetTemplate::new("owner", WidgetKind::Panel)
            .bounds(100.0, 50.0, 200.0, 100.0, PositionBase::PixelOwner)
            .child(child)
    }

    fn setup(t: &WidgetTemplate) -> Result<Scene> {
        let mut s = Scene::default().with_viewport(FixedViewport::new(800.0, 600.0));
        let id = s.create_widget(t)?;
        let root = s.root();
        s.insert_child(root, id)?;
        s.update()?;
        Ok(s)
    }

    fn id(s: &Scene, name: &str) -> WidgetId {
        s.find_widget(name).unwrap()
    }

    #[test]
    fn owner_percentages_are_invalidated() -> Result<()> {
        let child = WidgetTemplate::new("child", WidgetKind::Panel)
            .face(Face::Left, 0.0, PositionBase::PixelOwner)
            .face(Face::Right, 0.5, PositionBase::PercentageOwner);
        let mut s = setup(&owner_with_child(child))?;
        let (owner, child) = (id(&s, "owner"), id(&s, "child"));
        assert_eq!(s.pixel_position(child, Face::Right)?, 200.0);
        assert!(s.is_position_resolved(child, Face::Right));

        s.set_position(owner, Face::Left, 150.0, PositionBase::PixelViewport)?;
        assert!(!s.is_position_resolved(child, Face::Left));
        assert!(!s.is_position_resolved(child, Face::Right));
        assert_eq!(s.pixel_position(child, Face::Right)?, 250.0);
        assert_eq!(
            s.get_position(child, Face::Right, PositionBase::PercentageOwner)?,
            0.5
        );

        // Growing the owner widens the child.
        s.set_extent(owner, Face::Right.orientation(), 400.0)?;
        assert!(!s.is_position_resolved(child, Face::Right));
        assert_eq!(s.pixel_position(child, Face::Right)?, 350.0);
        Ok(())
    }

    #[test]
    fn resolution_is_idempotent() -> Result<()> {
        let t = WidgetTemplate::new("hud", WidgetKind::Panel)
            .bounds(0.1, 0.1, 0.8, 0.8, PositionBase::PercentageScene)
            .child(
                WidgetTemplate::new("score", WidgetKind::Label { text: "0".into() })
                    .bounds(0.0, 0.0, 0.25, 0.1, PositionBase::PercentageOwner)
                    .dock(
                        Face::Top,
                        None,
                        Face::Top,
                        DockPadding::new(0.05, PaddingBase::PercentageScene),
                    ),
            )
            .child(
                WidgetTemplate::new("lives", WidgetKind::Label { text: "3".into() })
                    .bounds(0.0, 0.0, 60.0, 20.0, PositionBase::PixelOwner)
                    .dock(Face::Left, Some("score"), Face::Right, DockPadding::pixels(8.0))
                    .dock(
                        Face::Top,
                        Some("score"),
                        Face::Top,
                        DockPadding::new(0.5, PaddingBase::PercentageTarget),
                    ),
            );
        let mut s = setup(&t)?;
        let snapshot = |s: &Scene| -> Vec<_> {
            s.preorder(s.root())
                .into_iter()
                .map(|w| *s.widget(w).unwrap().bounds())
                .collect()
        };
        s.resolve_positions();
        let first = snapshot(&s);
        assert_eq!(s.resolve_positions(), 0);
        assert_eq!(snapshot(&s), first);

        let lives = s.pixel_rect(id(&s, "lives"))?;
        let score = s.pixel_rect(id(&s, "score"))?;
        assert_eq!(lives.left, score.right + 8.0);
        assert_eq!(score.top, 30.0);
        assert_eq!(lives.top, score.top + 0.5 * score.height());
        Ok(())
    }

    #[test]
    fn viewport_changes_reach_percentages() -> Result<()> {
        let t = WidgetTemplate::new("half", WidgetKind::Panel).bounds(
            0.0,
            0.0,
            0.5,
            0.5,
            PositionBase::PercentageViewport,
        );
        let mut s = setup(&t)?;
        let half = id(&s, "half");
        assert_eq!(s.pixel_position(half, Face::Right)?, 400.0);
        s.set_viewport(Box::new(
            FixedViewport::new(1000.0, 500.0).with_origin(Point::new(10.0, 20.0)),
        ));
        let report = s.update()?;
        assert!(report.positions_moved > 0);
        assert_eq!(s.pixel_position(half, Face::Right)?, 500.0);
        let screen = s.screen_rect(half)?;
        assert_eq!((screen.left, screen.top), (10.0, 20.0));
        assert_eq!(screen.bottom, 270.0);
        Ok(())
    }

    #[test]
    fn window_resize_is_noticed() -> Result<()> {
        let window = Window(Rc::new(Cell::new(Size::new(800.0, 600.0))));
        let mut s = Scene::default().with_viewport(window.clone());
        let half = s.create_widget(&WidgetTemplate::new("half", WidgetKind::Panel).bounds(
            0.0,
            0.0,
            0.5,
            0.5,
            PositionBase::PercentageViewport,
        ))?;
        let root = s.root();
        s.insert_child(root, half)?;
        s.update()?;
        assert_eq!(s.pixel_position(half, Face::Right)?, 400.0);
        assert!(s.update()?.stages.is_empty());

        window.0.set(Size::new(1000.0, 500.0));
        let report = s.update()?;
        assert!(report.stages.contains(&Stage::Positions));
        assert_eq!(s.pixel_position(half, Face::Right)?, 500.0);
        assert_eq!(s.pixel_position(half, Face::Bottom)?, 250.0);
        assert_eq!(s.pixel_position(root, Face::Right)?, 1000.0);
        Ok(())
    }

    #[test]
    fn small_moves_are_stored_quietly() -> Result<()> {
        let t = owner_with_child(
            WidgetTemplate::new("c", WidgetKind::Panel)
                .bounds(10.0, 10.0, 20.0, 20.0, PositionBase::PixelOwner),
        );
        let mut s = setup(&t)?;
        let c = id(&s, "c");
        assert!(!s.set_position(c, Face::Left, 10.0005, PositionBase::PixelOwner)?);
        let stored = s.widget(c)?.position().value(Face::Left);
        assert!(stored != 10.0);
        assert!((stored - 10.0005).abs() < 1e-4);
        assert!(s.is_position_resolved(c, Face::Left));
        assert!(s.pending_stages().is_empty());

        assert!(!s.set_extent(c, Orientation::Horizontal, 20.0005)?);
        assert!((s.widget(c)?.position().value(Face::Right) - 20.0005).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn undocking_keeps_last_position() -> Result<()> {
        let t = WidgetTemplate::new("p", WidgetKind::Panel)
            .child(
                WidgetTemplate::new("a", WidgetKind::Panel)
                    .bounds(100.0, 0.0, 40.0, 40.0, PositionBase::PixelOwner),
            )
            .child(
                WidgetTemplate::new("b", WidgetKind::Panel)
                    .bounds(0.0, 0.0, 40.0, 40.0, PositionBase::PixelOwner)
                    .dock(Face::Left, Some("a"), Face::Right, DockPadding::pixels(4.0)),
            );
        let mut s = setup(&t)?;
        let (a, b) = (id(&s, "a"), id(&s, "b"));
        assert_eq!(s.pixel_position(b, Face::Left)?, 144.0);
        assert!(s.clear_docking_target(b, Face::Left)?);
        s.set_position(a, Face::Left, 0.0, PositionBase::PixelOwner)?;
        s.update()?;
        assert_eq!(s.pixel_position(b, Face::Left)?, 144.0);
        Ok(())
    }

    fn value_for(base: PositionBase) -> BoxedStrategy<f32> {
        if base.is_percentage() {
            (-1.0f32..2.0).boxed()
        } else {
            (-500.0f32..1500.0).boxed()
        }
    }

    fn case() -> impl Strategy<Value = (PositionBase, usize, f32)> {
        (0..PositionBase::ALL.len(), 0..4usize)
            .prop_flat_map(|(b, f)| {
                let base = PositionBase::ALL[b];
                (Just(base), Just(f), value_for(base))
            })
    }

    proptest! {
        #[test]
        fn set_then_get_round_trips((base, face, value) in case()) {
            let child = WidgetTemplate::new("child", WidgetKind::Panel)
                .bounds(10.0, 10.0, 50.0, 30.0, PositionBase::PixelOwner);
            let mut s = setup(&owner_with_child(child)).unwrap();
            let child = id(&s, "child");
            let face = Face::ALL[face];
            s.set_position(child, face, value, base).unwrap();
            let got = s.get_position(child, face, base).unwrap();
            let tolerance = 1e-3 * value.abs().max(1.0);
            prop_assert!((got - value).abs() <= tolerance, "{base:?} {face}: set {value}, got {got}");
        }
    }
}
