use colony_counter::plates::{Dish, DishMask, MaskBounds, build_masks};

fn dish(x: f64, y: f64, r: f64) -> Dish {
    Dish {
        center_x: x,
        center_y: y,
        radius: r,
    }
}

#[test]
fn mask_matches_strict_distance_predicate_everywhere() {
    let d = dish(10.3, 7.6, 5.5);
    let mask = DishMask::for_dish(&d, 24, 18);
    assert_eq!(mask.shape(), (24, 18));
    for y in 0..18 {
        for x in 0..24 {
            let expected = d.center_distance(x as f64, y as f64) < d.radius;
            assert_eq!(mask.contains(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn pixels_exactly_on_the_radius_are_excluded() {
    let mask = DishMask::for_dish(&dish(10.0, 10.0, 5.0), 21, 21);
    assert!(!mask.contains(15, 10));
    assert!(!mask.contains(10, 5));
    assert!(!mask.contains(13, 14));
    assert!(mask.contains(14, 10));
    assert!(mask.contains(12, 13));
}

#[test]
fn one_mask_per_dish_in_order() {
    let dishes = [dish(5.0, 5.0, 3.0), dish(20.0, 5.0, 3.0), dish(35.0, 5.0, 3.0)];
    let masks = build_masks(&dishes, 40, 10);
    assert_eq!(masks.len(), 3);
    for (d, m) in dishes.iter().zip(&masks) {
        assert!(m.contains(d.center_x as usize, d.center_y as usize));
    }
    assert!(!masks[0].contains(20, 5));
}

#[test]
fn bounds_cover_exactly_the_set_pixels() {
    let mask = DishMask::for_dish(&dish(10.0, 10.0, 5.0), 30, 30);
    assert_eq!(
        mask.bounds(),
        Some(MaskBounds {
            x0: 6,
            y0: 6,
            x1: 15,
            y1: 15
        })
    );
    assert_eq!(mask.area(), 69);
}

#[test]
fn dish_partly_outside_the_image_is_clipped() {
    let mask = DishMask::for_dish(&dish(0.0, 0.0, 4.0), 10, 10);
    assert!(mask.contains(0, 0));
    assert!(mask.contains(3, 0));
    assert!(!mask.contains(4, 0));
    let bounds = mask.bounds().expect("non-empty mask");
    assert_eq!((bounds.x0, bounds.y0), (0, 0));
}

#[test]
fn dish_entirely_off_image_gives_empty_mask() {
    let mask = DishMask::for_dish(&dish(100.0, 100.0, 5.0), 10, 10);
    assert_eq!(mask.area(), 0);
    assert_eq!(mask.bounds(), None);
}
