//! Property-style tests over long random insert/move/remove histories

use std::collections::HashMap;

use approx::assert_relative_eq;
use dynamic_bvh::foundation::logging;
use dynamic_bvh::prelude::*;
use dynamic_bvh::NodeId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_aabb(rng: &mut StdRng, world: f32) -> Aabb {
    let center = Vec3::new(
        rng.gen_range(-world..world),
        rng.gen_range(-world..world),
        rng.gen_range(-world..world),
    );
    let half = Vec3::new(rng.gen_range(0.05..3.0), rng.gen_range(0.05..3.0), rng.gen_range(0.05..3.0));
    Aabb::from_center_extents(center, half)
}

fn everything() -> Aabb {
    Aabb::new(Vec3::new(-1.0e6, -1.0e6, -1.0e6), Vec3::new(1.0e6, 1.0e6, 1.0e6))
}

fn sorted(mut ids: Vec<ObjectId>) -> Vec<ObjectId> {
    ids.sort_unstable();
    ids
}

fn assert_tree_ok(bvh: &BoundingVolumeHierarchy) {
    if let Err(err) = bvh.validate() {
        panic!("{err}");
    }
    assert!(bvh.is_balanced());
}

#[test]
fn churn_preserves_count_balance_and_completeness() {
    logging::init_for_tests();
    let mut rng = StdRng::seed_from_u64(7);
    let mut bvh = BoundingVolumeHierarchy::default();
    let mut live: HashMap<ObjectId, Aabb> = HashMap::new();
    let mut next_id: ObjectId = 0;

    for round in 0..3_000 {
        let roll = rng.gen_range(0..100);
        if roll < 45 || live.is_empty() {
            let aabb = random_aabb(&mut rng, 200.0);
            bvh.insert(next_id, &aabb, 0.5);
            live.insert(next_id, aabb);
            next_id += 1;
        } else if roll < 80 {
            let id = *live.keys().nth(rng.gen_range(0..live.len())).expect("non-empty");
            let aabb = random_aabb(&mut rng, 200.0);
            bvh.move_object(id, &aabb, 0.5);
            live.insert(id, aabb);
        } else {
            let id = *live.keys().nth(rng.gen_range(0..live.len())).expect("non-empty");
            bvh.remove(id);
            live.remove(&id);
        }

        assert_eq!(bvh.size(), live.len());
        if round % 100 == 0 {
            assert_tree_ok(&bvh);
        }
    }

    assert_tree_ok(&bvh);
    let expected = sorted(live.keys().copied().collect());
    assert_eq!(sorted(bvh.bounded_object_ids_by_aabb(&everything())), expected);
    assert_eq!(sorted(bvh.bounded_object_ids()), expected);

    // Every stored leaf still covers the object's latest tight bounds.
    for (id, aabb) in &live {
        let fat = bvh.fat_bounds(*id).expect("live object has a leaf");
        assert_eq!(fat.contains(aabb), ContainmentType::Contains);
    }
}

#[test]
fn queries_are_sound_and_complete() {
    let mut rng = StdRng::seed_from_u64(11);
    let items: Vec<(ObjectId, Aabb)> = (0..500).map(|id| (id, random_aabb(&mut rng, 100.0))).collect();

    let mut dynamic = BoundingVolumeHierarchy::default();
    for (id, aabb) in &items {
        dynamic.insert(*id, aabb, 0.0);
    }
    let trees = [
        dynamic,
        BoundingVolumeHierarchy::from_items(&items, BuildStrategy::Fast),
        BoundingVolumeHierarchy::from_items(&items, BuildStrategy::Balanced),
        BoundingVolumeHierarchy::from_items(&items, BuildStrategy::Accurate),
    ];

    for _ in 0..50 {
        let query = random_aabb(&mut rng, 100.0).inflate(10.0);
        let sphere = BoundingSphere::new(query.center(), 15.0);
        let ray = Ray::new(
            query.center(),
            Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
        );
        let obb = OrientedBoundingBox::new(
            query.center(),
            Vec3::new(12.0, 3.0, 6.0),
            Quat::from_euler_angles(rng.gen_range(0.0..3.0), rng.gen_range(0.0..3.0), rng.gen_range(0.0..3.0)),
        );

        let brute = |test: &dyn Fn(&Aabb) -> bool| -> Vec<ObjectId> {
            sorted(items.iter().filter(|(_, aabb)| test(aabb)).map(|(id, _)| *id).collect())
        };
        let by_aabb = brute(&|aabb: &Aabb| query.intersects(aabb));
        let by_sphere = brute(&|aabb: &Aabb| sphere.intersects(aabb));
        let by_ray = brute(&|aabb: &Aabb| ray.intersects(aabb).is_some_and(|d| d <= 40.0));
        let by_obb = brute(&|aabb: &Aabb| obb.intersects(aabb));

        for tree in &trees {
            assert_eq!(sorted(tree.bounded_object_ids_by_aabb(&query)), by_aabb);
            assert_eq!(sorted(tree.bounded_object_ids_by_sphere(&sphere)), by_sphere);
            assert_eq!(sorted(tree.bounded_object_ids_by_ray(&ray, 40.0)), by_ray);
            assert_eq!(sorted(tree.bounded_object_ids_by_obb(&obb)), by_obb);
        }
    }
}

#[test]
fn micro_moves_leave_structure_alone() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut bvh = BoundingVolumeHierarchy::default();
    let mut tight = Vec::new();
    for id in 0..200 {
        let aabb = random_aabb(&mut rng, 50.0);
        bvh.insert(id, &aabb, 1.0);
        tight.push(aabb);
    }

    let leaves: Vec<Option<NodeId>> = (0..200).map(|id| bvh.leaf_id(id)).collect();
    let height = bvh.height();
    let nodes = bvh.node_count();

    for (id, aabb) in (0..200).zip(&tight) {
        let nudge = Vec3::new(rng.gen_range(-0.4..0.4), rng.gen_range(-0.4..0.4), rng.gen_range(-0.4..0.4));
        let moved = Aabb::new(aabb.min + nudge, aabb.max + nudge);
        bvh.move_object(id, &moved, 1.0);
    }

    assert_eq!((0..200).map(|id| bvh.leaf_id(id)).collect::<Vec<_>>(), leaves);
    assert_eq!(bvh.height(), height);
    assert_eq!(bvh.node_count(), nodes);
    assert_eq!(bvh.size(), 200);
}

#[test]
fn scenario_insert_remove_reinsert() {
    let mut bvh = BoundingVolumeHierarchy::default();
    for id in 1..=5 {
        let x = id as f32 * 4.0;
        bvh.insert(id, &Aabb::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 1.0)), 0.0);
    }
    bvh.remove(3);
    bvh.insert(6, &Aabb::new(Vec3::new(30.0, 0.0, 0.0), Vec3::new(31.0, 1.0, 1.0)), 0.0);

    assert_eq!(bvh.size(), 5);
    assert_eq!(sorted(bvh.bounded_object_ids()), vec![1, 2, 4, 5, 6]);
    assert!(!bvh.contains(3));

    bvh.remove(3);
    assert_eq!(bvh.size(), 5);
    assert_tree_ok(&bvh);
}

#[test]
fn scenario_fat_margin_move() {
    let mut bvh = BoundingVolumeHierarchy::default();
    let origin_box = Aabb::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5));
    bvh.insert(1, &origin_box, 1.0);
    bvh.insert(2, &Aabb::new(Vec3::new(20.0, 0.0, 0.0), Vec3::new(21.0, 1.0, 1.0)), 1.0);

    let fat = bvh.fat_bounds(1).expect("inserted");
    assert_relative_eq!(fat.min, Vec3::new(-1.5, -1.5, -1.5));
    assert_relative_eq!(fat.max, Vec3::new(1.5, 1.5, 1.5));

    let leaf = bvh.leaf_id(1);
    let nodes = bvh.node_count();
    bvh.move_object(1, &Aabb::new(Vec3::new(-0.4, -0.4, -0.4), Vec3::new(0.6, 0.6, 0.6)), 1.0);
    assert_eq!(bvh.leaf_id(1), leaf);
    assert_eq!(bvh.node_count(), nodes);

    bvh.move_object(1, &Aabb::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(6.0, 6.0, 6.0)), 1.0);
    assert_ne!(bvh.leaf_id(1), leaf);
    let fat = bvh.fat_bounds(1).expect("still present");
    assert_relative_eq!(fat.min, Vec3::new(4.0, 4.0, 4.0));
    assert_relative_eq!(fat.max, Vec3::new(7.0, 7.0, 7.0));
    assert_tree_ok(&bvh);
}

#[test]
fn config_drives_default_operations() {
    let config = BvhConfig {
        default_margin: 0.25,
        build_strategy: BuildStrategy::Accurate,
        ..BvhConfig::default()
    };
    let mut bvh = BoundingVolumeHierarchy::with_config(config);
    let aabb = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
    bvh.insert_default(1, &aabb);
    assert_eq!(bvh.fat_bounds(1), Some(aabb.inflate(0.25)));

    let far = Aabb::new(Vec3::new(9.0, 9.0, 9.0), Vec3::new(10.0, 10.0, 10.0));
    bvh.move_default(1, &far);
    assert_eq!(bvh.fat_bounds(1), Some(far.inflate(0.25)));

    bvh.rebuild();
    assert_eq!(bvh.config().build_strategy, BuildStrategy::Accurate);
    assert_eq!(bvh.size(), 1);
}
