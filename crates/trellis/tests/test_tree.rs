//! Integration tests for tree structure and widget removal.

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use trellis::{
        FocusManager, PositionResolver, Result, Scene, WidgetKind, WidgetTemplate,
        WidgetId, docking::DockPadding, error::Error, geom::Face, viewport::FixedViewport,
    };

    fn button(name: &str) -> WidgetTemplate {
        WidgetTemplate::new(name, WidgetKind::Button { caption: name.into() })
    }

    fn setup(t: &WidgetTemplate) -> Result<Scene> {
        let mut s = Scene::default().with_viewport(FixedViewport::new(640.0, 480.0));
        let id = s.create_widget(t)?;
        let root = s.root();
        s.insert_child(root, id)?;
        s.update()?;
        Ok(s)
    }

    #[test]
    fn destroy_severs_every_reference() -> Result<()> {
        let t = WidgetTemplate::new("menu", WidgetKind::Panel)
            .child(button("a").navigate(Face::Right, "b"))
            .child(
                button("b").dock(Face::Left, Some("a"), Face::Right, DockPadding::pixels(2.0)),
            )
            .child(button("c").dock(Face::Top, Some("b"), Face::Bottom, DockPadding::pixels(2.0)));
        let mut s = setup(&t)?;
        let (a, b, c) = (
            s.find_widget("a").unwrap(),
            s.find_widget("b").unwrap(),
            s.find_widget("c").unwrap(),
        );
        s.set_focus(b, None, 0)?;
        assert_eq!(s.focused_control(0), Some(b));
        let before = s.len();

        s.destroy_widget(b)?;
        assert_eq!(s.len(), before - 1);
        assert!(!s.contains(b));
        assert_eq!(s.find_widget("b"), None);
        assert_eq!(s.widget(b).unwrap_err(), Error::WidgetNotFound(b));
        assert!(s.widget(a)?.navigation().target(Face::Right) != Some(b));
        assert!(s.widget(c)?.docking().get(Face::Top).is_none());
        assert!(s.focused_control(0) != Some(b));
        assert!(s.pending_events().iter().all(|e| e.activator != b));

        s.update()?;
        assert!(s.docking_stack().nodes().iter().all(|n| n.widget != b));
        assert!(s.pixel_position(c, Face::Top)?.is_finite());
        Ok(())
    }

    #[test]
    fn removal_releases_focus_and_reattaches() -> Result<()> {
        let t = WidgetTemplate::new("menu", WidgetKind::Panel)
            .child(WidgetTemplate::new("group", WidgetKind::Panel).child(button("x")))
            .child(button("y"));
        let mut s = setup(&t)?;
        let (menu, group, x) = (
            s.find_widget("menu").unwrap(),
            s.find_widget("group").unwrap(),
            s.find_widget("x").unwrap(),
        );
        assert_eq!(s.focused_control(0), Some(x));

        s.remove_child(menu, group)?;
        assert!(!s.is_attached(group));
        assert!(!s.is_focused(x, 0));
        assert!(!s.can_accept_focus(x, 0));
        s.update()?;
        assert!(s.focus_first_control(menu, 0)?);
        assert_eq!(s.focused_control(0), s.find_widget("y"));

        let root = s.root();
        s.insert_child(root, group)?;
        assert!(s.is_attached(x));
        assert_eq!(
            s.insert_child(menu, group).unwrap_err(),
            Error::AlreadyAttached(group)
        );
        Ok(())
    }

    #[test]
    fn structural_refusals() -> Result<()> {
        let t = WidgetTemplate::new("outer", WidgetKind::Panel)
            .child(WidgetTemplate::new("inner", WidgetKind::Panel));
        let mut s = setup(&t)?;
        let (outer, inner) = (s.find_widget("outer").unwrap(), s.find_widget("inner").unwrap());
        let root = s.root();
        s.remove_child(root, outer)?;
        assert!(matches!(
            s.insert_child(inner, outer),
            Err(Error::WouldCreateCycle { .. })
        ));
        assert!(s.insert_child(outer, root).is_err());
        assert!(s.destroy_widget(root).is_err());
        assert!(
            s.create_widget(&WidgetTemplate::new("nested", WidgetKind::Scene))
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn templates_from_json() -> Result<()> {
        let t = WidgetTemplate::from_json(
            r#"{
                "name": "Options",
                "kind": {"type": "panel"},
                "children": [
                    {"name": "Volume", "kind": {"type": "slider", "value": 0.5}, "tab_index": 1},
                    {"name": "Back", "kind": {"type": "button", "caption": "Back"}, "tab_index": 0,
                     "docking": [{"face": "left", "target": "Volume", "target_face": "right"}]}
                ]
            }"#,
        )?;
        let mut s = setup(&t)?;
        let back = s.find_widget("back").unwrap();
        assert_eq!(s.focused_control(0), Some(back));
        assert!(s.widget(back)?.docking().is_docked(Face::Left));
        assert!(s.diagnostics().next().is_none());

        // A second copy gets fresh names.
        let copy = s.create_widget(&t)?;
        assert_eq!(s.widget(copy)?.name(), &"options_1");
        Ok(())
    }

    /// Check every live widget against its parent and the focus chains.
    fn check_tree(s: &Scene, live: &[WidgetId]) {
        assert_eq!(s.len(), live.len() + 1);
        for id in live {
            if let Some(p) = s.parent(*id).unwrap() {
                assert!(s.children(p).unwrap().contains(id));
            }
        }
        for v in 0..2 {
            let chain = s.focus_chain(v);
            assert!(chain.iter().all(|w| s.is_attached(*w)));
            for pair in chain.windows(2) {
                assert_eq!(s.parent(pair[1]).unwrap(), Some(pair[0]));
            }
        }
    }

    #[test]
    fn random_trees_stay_consistent() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0x7e11);
        let mut s = Scene::default().with_viewport(FixedViewport::new(640.0, 480.0));
        let root = s.root();
        let mut live: Vec<WidgetId> = Vec::new();
        for _ in 0..300 {
            let pick = |rng: &mut StdRng, live: &[WidgetId]| {
                (!live.is_empty()).then(|| live[rng.random_range(0..live.len())])
            };
            match rng.random_range(0..6) {
                0 | 1 => {
                    let id = s.create_widget(&button("node"))?;
                    let parent = pick(&mut rng, &live).unwrap_or(root);
                    s.insert_child(parent, id)?;
                    live.push(id);
                }
                2 => {
                    let (Some(w), Some(p)) = (pick(&mut rng, &live), pick(&mut rng, &live)) else {
                        continue;
                    };
                    let old = s.parent(w)?.unwrap_or(root);
                    s.remove_child(old, w)?;
                    if w == p || s.is_ancestor(w, p) {
                        assert!(matches!(
                            s.insert_child(p, w),
                            Err(Error::WouldCreateCycle { .. })
                        ));
                        s.insert_child(root, w)?;
                    } else {
                        s.insert_child(p, w)?;
                    }
                }
                3 => {
                    let Some(w) = pick(&mut rng, &live) else {
                        continue;
                    };
                    let doomed = s.preorder(w);
                    s.destroy_widget(w)?;
                    live.retain(|id| !doomed.contains(id));
                    assert!(doomed.iter().all(|d| !s.contains(*d)));
                }
                4 => {
                    if let Some(w) = pick(&mut rng, &live) {
                        s.set_focus(w, None, 0)?;
                    }
                }
                _ => {
                    s.update()?;
                }
            }
            s.debug_assert_tree_invariants();
            check_tree(&s, &live);
        }
        Ok(())
    }
}
