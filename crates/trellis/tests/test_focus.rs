//! Integration tests for focus behavior.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use trellis::{
        FocusManager, Result, Scene, SceneConfig, WidgetId, WidgetKind, WidgetTemplate,
        event::EventTag, state::StateKind, viewport::FixedViewport,
    };

    fn button(name: &str) -> WidgetTemplate {
        WidgetTemplate::new(name, WidgetKind::Button { caption: name.into() })
    }

    fn build(config: SceneConfig, t: &WidgetTemplate) -> Result<Scene> {
        let mut s = Scene::new(config).with_viewport(FixedViewport::new(320.0, 240.0));
        let id = s.create_widget(t)?;
        let root = s.root();
        s.insert_child(root, id)?;
        Ok(s)
    }

    fn id(s: &Scene, name: &str) -> WidgetId {
        s.find_widget(name).unwrap()
    }

    #[test]
    fn explicit_tab_order() -> Result<()> {
        let t = WidgetTemplate::new("menu", WidgetKind::Panel)
            .child(button("two").tab_index(2))
            .child(button("zero").tab_index(0))
            .child(button("one").tab_index(1));
        let mut s = build(SceneConfig::default(), &t)?;
        s.update()?;
        assert_eq!(s.focused_control(0), Some(id(&s, "zero")));
        assert!(s.next_control(0)?);
        assert_eq!(s.focused_control(0), Some(id(&s, "one")));
        assert!(s.next_control(0)?);
        assert_eq!(s.focused_control(0), Some(id(&s, "two")));
        assert!(s.prev_control(0)?);
        assert_eq!(s.focused_control(0), Some(id(&s, "one")));
        Ok(())
    }

    #[test]
    fn nested_containers_are_entered() -> Result<()> {
        let t = WidgetTemplate::new("menu", WidgetKind::Panel)
            .child(WidgetTemplate::new("top", WidgetKind::Panel).child(button("a")).child(button("b")))
            .child(WidgetTemplate::new("bottom", WidgetKind::Panel).child(button("c")));
        let mut s = build(SceneConfig::default(), &t)?;
        s.update()?;
        assert_eq!(s.focused_control(0), Some(id(&s, "a")));
        s.next_control(0)?;
        s.next_control(0)?;
        assert_eq!(s.focused_control(0), Some(id(&s, "c")));
        assert!(!s.is_focused(id(&s, "top"), 0));
        // Wraps back to the start.
        s.next_control(0)?;
        assert_eq!(s.focused_control(0), Some(id(&s, "a")));
        s.prev_control(0)?;
        assert_eq!(s.focused_control(0), Some(id(&s, "c")));
        Ok(())
    }

    #[test]
    fn split_screen_viewers() -> Result<()> {
        let config = SceneConfig {
            active_viewers: 0b0011,
            ..SceneConfig::default()
        };
        let t = WidgetTemplate::new("hud", WidgetKind::Panel)
            .child(button("p1").input_mask(0b0001))
            .child(button("p2").input_mask(0b0010))
            .child(button("shared"));
        let mut s = build(config, &t)?;
        s.update()?;
        assert_eq!(s.focused_control(0), Some(id(&s, "p1")));
        assert_eq!(s.focused_control(1), Some(id(&s, "p2")));
        s.take_events();

        let shared = id(&s, "shared");
        assert!(s.set_focus(shared, None, 1)?);
        assert_eq!(s.focused_control(0), Some(id(&s, "p1")));
        assert!(!s.set_focus(id(&s, "p1"), None, 1)?);
        assert_eq!(s.focused_control(1), Some(shared));

        let events = s.take_events();
        assert!(events.iter().all(|e| e.viewer == 1));
        assert!(events
            .iter()
            .any(|e| e.tag == EventTag::FocusReceived && e.activator == shared));
        Ok(())
    }

    #[test]
    fn focus_lock_holds() -> Result<()> {
        let t = WidgetTemplate::new("dialog", WidgetKind::Panel)
            .child(button("name").focus_lock())
            .child(button("ok"));
        let mut s = build(SceneConfig::default(), &t)?;
        s.update()?;
        let name = id(&s, "name");
        assert_eq!(s.focused_control(0), Some(name));
        assert!(!s.set_focus(id(&s, "ok"), None, 0)?);
        s.next_control(0)?;
        assert_eq!(s.focused_control(0), Some(name));

        s.set_focus_lock(name, false)?;
        assert!(s.next_control(0)?);
        assert_eq!(s.focused_control(0), Some(id(&s, "ok")));
        assert!(!s.widget(name)?.states().is_active(0, StateKind::Focused));
        Ok(())
    }

    #[test]
    fn hiding_moves_nothing_but_drops_focus() -> Result<()> {
        let t = WidgetTemplate::new("menu", WidgetKind::Panel)
            .child(button("a"))
            .child(button("b"));
        let mut s = build(SceneConfig::default(), &t)?;
        s.update()?;
        let a = id(&s, "a");
        assert!(s.set_visible(a, false)?);
        assert!(!s.is_focused(a, 0));
        assert!(!s.can_accept_focus(a, 0));
        assert!(s.next_control(0)?);
        assert_eq!(s.focused_control(0), Some(id(&s, "b")));
        Ok(())
    }

    #[test]
    fn locked_focus_refuses_disable_and_hide() -> Result<()> {
        let t = WidgetTemplate::new("dialog", WidgetKind::Panel)
            .child(button("name").focus_lock())
            .child(button("ok"));
        let mut s = build(SceneConfig::default(), &t)?;
        s.update()?;
        let name = id(&s, "name");
        assert_eq!(s.focused_control(0), Some(name));

        assert!(!s.activate_state(name, 0, StateKind::Disabled)?);
        assert!(!s.set_visible(name, false)?);
        let w = s.widget(name)?;
        assert!(w.is_visible());
        assert!(w.states().is_active(0, StateKind::Focused));
        assert!(!w.states().is_active(0, StateKind::Disabled));
        assert_eq!(s.focused_control(0), Some(name));
        assert!(s.can_accept_focus(name, 0));

        s.set_focus_lock(name, false)?;
        assert!(s.activate_state(name, 0, StateKind::Disabled)?);
        assert!(!s.is_focused(name, 0));
        assert!(s.focused_control(0) != Some(name));
        Ok(())
    }

    #[test]
    fn enabling_restores_enabled_state() -> Result<()> {
        let t = WidgetTemplate::new("menu", WidgetKind::Panel)
            .child(button("a"))
            .child(button("b"));
        let mut s = build(SceneConfig::default(), &t)?;
        s.update()?;
        let b = id(&s, "b");
        assert!(s.widget(b)?.states().is_active(0, StateKind::Enabled));

        assert!(s.activate_state(b, 0, StateKind::Disabled)?);
        assert!(!s.widget(b)?.states().is_active(0, StateKind::Enabled));
        s.take_events();

        assert!(s.deactivate_state(b, 0, StateKind::Disabled)?);
        let states = s.widget(b)?.states();
        assert!(states.is_active(0, StateKind::Enabled));
        assert!(!states.is_active(0, StateKind::Disabled));
        assert!(s.can_accept_focus(b, 0));
        let tags: Vec<EventTag> = s
            .take_events()
            .into_iter()
            .filter(|e| e.activator == b)
            .map(|e| e.tag)
            .collect();
        assert_eq!(
            tags,
            vec![
                EventTag::StateDeactivated(StateKind::Disabled),
                EventTag::StateActivated(StateKind::Enabled)
            ]
        );
        Ok(())
    }

    /// Check that each viewer's focused widgets form one path from the root.
    fn assert_single_path(s: &Scene, viewers: usize) {
        let all = s.preorder(s.root());
        for v in 0..viewers {
            for w in &all {
                if !s.is_focused(*w, v) {
                    continue;
                }
                let widget = s.widget(*w).unwrap();
                let focused_children: Vec<_> = widget
                    .children()
                    .iter()
                    .filter(|c| s.is_focused(**c, v))
                    .collect();
                assert!(focused_children.len() <= 1, "focus chain forks at {}", widget.name());
                let rec = widget.focus_controls(v).unwrap();
                assert_eq!(rec.focused, focused_children.first().map(|c| **c));
                if let Some(p) = widget.parent() {
                    assert!(s.is_focused(p, v), "{} focused without its parent", widget.name());
                }
            }
            let chain = s.focus_chain(v);
            let count = all.iter().filter(|w| s.is_focused(**w, v)).count();
            assert_eq!(chain.len(), count);
        }
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Set(usize, usize),
        Kill(usize, usize),
        Next(usize),
        Prev(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..9usize, 0..2usize).prop_map(|(w, v)| Op::Set(w, v)),
            (0..9usize, 0..2usize).prop_map(|(w, v)| Op::Kill(w, v)),
            (0..2usize).prop_map(Op::Next),
            (0..2usize).prop_map(Op::Prev),
        ]
    }

    proptest! {
        #[test]
        fn focus_chain_never_forks(ops in prop::collection::vec(op(), 1..40)) {
            let config = SceneConfig {
                active_viewers: 0b0011,
                ..SceneConfig::default()
            };
            let t = WidgetTemplate::new("ui", WidgetKind::Panel)
                .child(WidgetTemplate::new("left", WidgetKind::Panel).child(button("a")).child(button("b")))
                .child(
                    WidgetTemplate::new("right", WidgetKind::Panel)
                        .child(button("c").focus_lock())
                        .child(button("d").input_mask(0b0010)),
                )
                .child(button("e"));
            let mut s = build(config, &t).unwrap();
            s.update().unwrap();
            let ids = s.preorder(s.root());
            prop_assert_eq!(ids.len(), 9);
            for op in ops {
                match op {
                    Op::Set(w, v) => {
                        s.set_focus(ids[w], None, v).unwrap();
                    }
                    Op::Kill(w, v) => {
                        s.kill_focus(ids[w], None, v).unwrap();
                    }
                    Op::Next(v) => {
                        s.next_control(v).unwrap();
                    }
                    Op::Prev(v) => {
                        s.prev_control(v).unwrap();
                    }
                }
                assert_single_path(&s, 2);
            }
        }
    }
}
