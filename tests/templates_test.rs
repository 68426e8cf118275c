use glam::Vec2;
use lottie_motion::{
    apply_template, plan_channels, AnimationRequest, AnimationType, ChannelValue, Easing,
    EasingIntent, LayerTransform, LayerTree, MotionContext, MotionDefaults, MotionError,
    PropertyKind, SourceLayer,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn three_layer_tree() -> LayerTree {
    let layers = ["circle", "square", "star"]
        .iter()
        .enumerate()
        .map(|(z, id)| {
            SourceLayer::shape(*id, Vec::new())
                .with_transform(LayerTransform::centered_on(Vec2::new(100.0, 50.0)))
                .with_z_index(z as i32)
        })
        .collect();
    LayerTree::new(200, 100, layers)
}

fn scalar_keys(channel: &lottie_motion::PropertyChannel) -> Vec<(u32, f32)> {
    channel
        .keyframes()
        .iter()
        .map(|k| (k.frame, k.value.as_scalar().unwrap()))
        .collect()
}

#[test]
fn test_fade_in_one_channel_per_layer() {
    init_tracing();
    let tree = three_layer_tree();
    let request = AnimationRequest::new(AnimationType::FadeIn);

    let (channels, duration) = plan_channels(&tree, &request, &MotionDefaults::default()).unwrap();

    assert_eq!(duration, 60);
    assert_eq!(channels.len(), 3);
    for (channel, id) in channels.iter().zip(["circle", "square", "star"]) {
        assert_eq!(channel.layer(), id);
        assert_eq!(channel.kind(), PropertyKind::Opacity);
        assert_eq!(scalar_keys(channel), vec![(0, 0.0), (30, 100.0)]);
        assert_eq!(channel.first().easing, Easing::Linear);
    }
}

#[test]
fn test_fade_in_midpoint_on_odd_duration() {
    let tree = three_layer_tree();
    let request = AnimationRequest::new(AnimationType::FadeIn).with_duration(61);

    let (channels, duration) =
        plan_channels(&tree, &request, &MotionDefaults::default()).unwrap();

    assert_eq!(duration, 61);
    assert_eq!(scalar_keys(&channels[0]), vec![(0, 0.0), (30, 100.0)]);
}

#[test]
fn test_keys_stay_inside_duration() {
    init_tracing();
    let tree = three_layer_tree();
    let ctx = MotionContext::for_tree(&tree, 30);

    for animation_type in AnimationType::ALL {
        let Some(motion) = animation_type.motion() else {
            continue;
        };
        for duration in [1, 2, 3, 7, 60, 61, 300] {
            let channels = apply_template(&tree, motion, duration, &ctx, None).unwrap();
            for channel in &channels {
                let (first, last) = channel.span();
                assert_eq!(first, 0, "{animation_type} over {duration}");
                assert!(last <= duration, "{animation_type} over {duration}");
                assert!(channel
                    .keyframes()
                    .windows(2)
                    .all(|pair| pair[0].frame < pair[1].frame));
            }
        }
    }
}

#[test]
fn test_duration_one_ends_at_rest() {
    let tree = three_layer_tree();
    let request = AnimationRequest::new(AnimationType::Bounce).with_duration(1);

    let (channels, _) = plan_channels(&tree, &request, &MotionDefaults::default()).unwrap();

    let keys = channels[0].keyframes();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].frame, 0);
    assert_eq!(keys[1].frame, 1);
    assert_eq!(keys[1].value, ChannelValue::Vector(Vec2::splat(100.0)));
}

#[test]
fn test_bounce_single_overshoot_cycle() {
    let tree = three_layer_tree();
    let request = AnimationRequest::new(AnimationType::Bounce);

    let (channels, _) = plan_channels(&tree, &request, &MotionDefaults::default()).unwrap();

    let channel = &channels[0];
    assert_eq!(channel.kind(), PropertyKind::Scale);
    let frames: Vec<u32> = channel.keyframes().iter().map(|k| k.frame).collect();
    assert_eq!(frames, vec![0, 19, 39, 60]);

    let expected = [100.0, 130.0, 90.0, 100.0];
    for (key, percent) in channel.keyframes().iter().zip(expected) {
        let scale = key.value.as_vec2().unwrap();
        assert!((scale.x - percent).abs() < 1e-3);
        assert!((scale.y - percent).abs() < 1e-3);
    }
    assert!(channel.keyframes()[..3]
        .iter()
        .all(|k| k.easing == EasingIntent::EaseInOut.easing()));
}

#[test]
fn test_scale_up_and_rotate_are_relative_to_rest() {
    let layer = SourceLayer::shape("logo", Vec::new()).with_transform(LayerTransform {
        scale: Vec2::new(80.0, 40.0),
        rotation: 15.0,
        ..LayerTransform::default()
    });
    let tree = LayerTree::new(64, 64, vec![layer]);
    let defaults = MotionDefaults::default();

    let (scale, _) =
        plan_channels(&tree, &AnimationRequest::new(AnimationType::ScaleUp), &defaults).unwrap();
    let keys = scale[0].keyframes();
    assert_eq!(keys[0].value, ChannelValue::Vector(Vec2::new(40.0, 20.0)));
    assert_eq!(keys[1].value, ChannelValue::Vector(Vec2::new(80.0, 40.0)));
    assert_eq!(keys[1].frame, 30);
    assert_eq!(keys[0].easing, EasingIntent::EaseOut.easing());

    let (rotation, _) =
        plan_channels(&tree, &AnimationRequest::new(AnimationType::Rotate), &defaults).unwrap();
    assert_eq!(scalar_keys(&rotation[0]), vec![(0, 15.0), (60, 375.0)]);
}

#[test]
fn test_unknown_animation_type() {
    let err = "spin".parse::<AnimationType>().unwrap_err();
    assert!(matches!(err, MotionError::UnknownAnimationType { ref name, .. } if name == "spin"));
    assert!(err.to_string().contains("bottom_to_center"));

    let parsed: Result<AnimationRequest, _> =
        serde_json::from_value(serde_json::json!({ "animation_type": "spin" }));
    let message = parsed.unwrap_err().to_string();
    assert!(message.contains("unknown animation type 'spin'"), "{message}");
    assert!(message.contains("bottom_to_center, complex"), "{message}");
}

#[test]
fn test_children_follow_parent() {
    let child = SourceLayer::shape("wheel", Vec::new());
    let car = SourceLayer::group("car", vec![child]);
    let tree = LayerTree::new(100, 100, vec![car]);

    let (channels, _) = plan_channels(
        &tree,
        &AnimationRequest::new(AnimationType::Rotate),
        &MotionDefaults::default(),
    )
    .unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].layer(), "car");

    let scoped = AnimationRequest::new(AnimationType::Rotate).with_layers(vec!["wheel".into()]);
    let (channels, _) = plan_channels(&tree, &scoped, &MotionDefaults::default()).unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].layer(), "wheel");
}

#[test]
fn test_group_fade_lands_on_drawn_descendants() {
    init_tracing();
    let wheel = SourceLayer::shape("wheel", Vec::new());
    let hub = SourceLayer::group("hub", vec![SourceLayer::shape("bolt", Vec::new())]);
    let car = SourceLayer::group("car", vec![wheel, hub]);
    let tree = LayerTree::new(100, 100, vec![car]);

    let (channels, _) = plan_channels(
        &tree,
        &AnimationRequest::new(AnimationType::FadeIn),
        &MotionDefaults::default(),
    )
    .unwrap();
    let layers: Vec<&str> = channels.iter().map(|c| c.layer()).collect();
    assert_eq!(layers, vec!["wheel", "bolt"]);

    // Naming both a group and its child animates the child once.
    let scoped = AnimationRequest::new(AnimationType::FadeIn)
        .with_layers(vec!["car".into(), "wheel".into()]);
    let (channels, _) = plan_channels(&tree, &scoped, &MotionDefaults::default()).unwrap();
    assert_eq!(channels.len(), 2);
}

#[test]
fn test_scope_rejects_unknown_layer() {
    let tree = three_layer_tree();
    let request = AnimationRequest::new(AnimationType::FadeIn).with_layers(vec!["moon".into()]);
    assert_eq!(
        plan_channels(&tree, &request, &MotionDefaults::default()).unwrap_err(),
        MotionError::UnknownLayer {
            layer: "moon".to_string()
        }
    );
}
