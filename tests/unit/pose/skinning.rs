use super::*;

fn influence(joints: &[u32], weights: &[f32]) -> JointInfluence {
    JointInfluence {
        joints: joints.to_vec(),
        weights: weights.to_vec(),
    }
}

#[test]
fn identity_palette_reproduces_rest() {
    let p = Vec3::new(1.0, 2.0, 3.0);
    let out = skin_vertex(p, &influence(&[0, 1], &[0.3, 0.7]), &[Mat4::IDENTITY; 2]).unwrap();
    assert!(out.abs_diff_eq(p, 1e-6));
}

#[test]
fn full_weight_translates_vertex() {
    let palette = [Mat4::IDENTITY, Mat4::from_translation(Vec3::new(0.0, 1.5, 0.0))];
    let out = skin_vertex(Vec3::ZERO, &influence(&[1], &[1.0]), &palette).unwrap();
    assert!(out.abs_diff_eq(Vec3::new(0.0, 1.5, 0.0), 1e-6));
}

#[test]
fn weights_are_normalized() {
    let palette = [Mat4::from_translation(Vec3::X * 2.0), Mat4::IDENTITY];
    // 2:2 weights behave like 0.5:0.5.
    let out = skin_vertex(Vec3::ZERO, &influence(&[0, 1], &[2.0, 2.0]), &palette).unwrap();
    assert!(out.abs_diff_eq(Vec3::X, 1e-6));
}

#[test]
fn unweighted_vertex_stays_put() {
    let palette = [Mat4::from_translation(Vec3::ONE)];
    let p = Vec3::new(4.0, 5.0, 6.0);
    assert_eq!(skin_vertex(p, &JointInfluence::default(), &palette), Ok(p));
    assert_eq!(skin_vertex(p, &influence(&[0], &[0.0]), &palette), Ok(p));
}

#[test]
fn out_of_palette_joint_is_reported() {
    assert_eq!(
        skin_vertex(Vec3::ZERO, &influence(&[3], &[1.0]), &[Mat4::IDENTITY]),
        Err(3)
    );
}

#[test]
fn evaluator_applies_world_after_skinning() {
    let world = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
    let palettes = vec![
        vec![Mat4::IDENTITY],
        vec![Mat4::from_translation(Vec3::Z)],
    ];
    let mut eval = SkinnedPoseEvaluator::new(
        world,
        vec![Vec3::ZERO, Vec3::Y],
        vec![influence(&[0], &[1.0]), JointInfluence::default()],
        FrameNumber(1),
        palettes,
    )
    .unwrap();

    let f1 = eval.evaluate(FrameNumber(1)).unwrap();
    assert!(f1[0].abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-6));

    let f2 = eval.evaluate(FrameNumber(2)).unwrap();
    assert!(f2[0].abs_diff_eq(Vec3::new(10.0, 0.0, 1.0), 1e-6));
    assert!(f2[1].abs_diff_eq(Vec3::new(10.0, 1.0, 0.0), 1e-6));

    assert!(matches!(
        eval.evaluate(FrameNumber(3)),
        Err(VatError::Evaluation(_))
    ));
}

#[test]
fn mismatched_influences_are_rejected() {
    let res = SkinnedPoseEvaluator::new(
        Mat4::IDENTITY,
        vec![Vec3::ZERO; 3],
        vec![JointInfluence::default(); 2],
        FrameNumber(1),
        vec![],
    );
    assert!(res.is_err());
}

#[test]
fn joint_weight_length_mismatch_is_rejected() {
    let err = SkinnedPoseEvaluator::new(
        Mat4::IDENTITY,
        vec![Vec3::ZERO, Vec3::X],
        vec![influence(&[0], &[1.0]), influence(&[0, 1], &[1.0])],
        FrameNumber(1),
        vec![vec![Mat4::IDENTITY; 2]],
    )
    .unwrap_err();
    assert!(err.to_string().contains("vertex 1 has 2 joints but 1 weights"), "{err}");
}
