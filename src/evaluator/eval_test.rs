//! Unit tests for evaluation: arithmetic, history addressing, vector
//! semantics, conditionals and the caller contract.

use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;
use crate::{History, Scalar, ScalarType, compile};

use ScalarType::{Double, Float, Int32};

/// Feed scalar float samples through a freshly compiled mapping and
/// collect one outcome per sample.
fn run(src: &str, inputs: &[f32]) -> Vec<Option<f32>> {
    let program = compile(src, Float, Float, 1, 1).unwrap();
    let mut input = History::new(Float, 1, program.input_history_depth());
    let mut output = History::new(Float, 1, program.output_history_depth());
    let mut evaluator = Evaluator::new(&program);
    inputs
        .iter()
        .map(|&x| {
            input.push(&[Scalar::Float(x)]);
            match evaluator.evaluate(&input, &mut output).unwrap() {
                EvalStatus::Output => Some(output.latest().unwrap()[0].as_f32()),
                EvalStatus::NoOutput => None,
            }
        })
        .collect()
}

#[test]
fn multiplies_the_current_sample() {
    assert_eq!(run("y = x * 2", &[3.0, -1.5]), vec![Some(6.0), Some(-3.0)]);
}

#[test]
fn history_offset_reads_previous_samples() {
    // the first evaluation reads a zero-filled slot for x{-1}
    assert_eq!(
        run("y = x{-1} + x", &[1.0, 2.0, 5.0]),
        vec![Some(1.0), Some(3.0), Some(7.0)]
    );
}

#[test]
fn feedback_smoothing_filter() {
    assert_eq!(
        run("y = (x + y{-1}) * 0.5", &[4.0, 4.0, 4.0]),
        vec![Some(2.0), Some(3.0), Some(3.5)]
    );
}

#[test]
fn ternary_with_else_selects_per_element() {
    assert_eq!(
        run("y = (x > 0) ? x : -x", &[-5.0, 4.0, 0.0]),
        vec![Some(5.0), Some(4.0), Some(0.0)]
    );
}

#[test]
fn else_less_conditional_gates_output() {
    assert_eq!(
        run("y = x > 0 ? x", &[-1.0, 2.0]),
        vec![None, Some(2.0)]
    );
}

#[test]
fn gated_sample_leaves_the_output_untouched() {
    let program = compile("y = x > 0 ? x", Float, Float, 1, 1).unwrap();
    let mut input = History::new(Float, 1, 1);
    let mut output = History::new(Float, 1, 1);
    let mut evaluator = Evaluator::new(&program);

    input.push(&[Scalar::Float(-1.0)]);
    assert_eq!(
        evaluator.evaluate(&input, &mut output).unwrap(),
        EvalStatus::NoOutput
    );
    assert_eq!(output.position(), -1);
    assert_eq!(output.latest(), None);
}

#[test]
fn one_false_predicate_element_gates_the_whole_vector() {
    let program = compile("y = x > 0 ? x", Float, Float, 2, 2).unwrap();
    let mut input = History::new(Float, 2, 1);
    let mut output = History::new(Float, 2, 1);
    let mut evaluator = Evaluator::new(&program);

    input.push(&[Scalar::Float(1.0), Scalar::Float(-1.0)]);
    assert_eq!(
        evaluator.evaluate(&input, &mut output).unwrap(),
        EvalStatus::NoOutput
    );
    assert_eq!(output.position(), -1);
}

#[test]
fn promotion_spans_both_operand_subtrees() {
    let program = compile("y = (x + 1) * (x - 0.5)", Int32, Float, 1, 1).unwrap();
    let mut input = History::new(Int32, 1, 1);
    let mut output = History::new(Float, 1, 1);
    let mut evaluator = Evaluator::new(&program);

    input.push(&[Scalar::Int32(3)]);
    evaluator.evaluate(&input, &mut output).unwrap();
    assert_eq!(output.latest().unwrap(), &[Scalar::Float(10.0)]);
}

#[test]
fn logical_not() {
    assert_eq!(run("y = !x", &[0.0, 3.0]), vec![Some(1.0), Some(0.0)]);
}

#[test]
fn slicing_passes_elements_through() {
    let program = compile("y = x[0:1]", Float, Float, 3, 2).unwrap();
    let mut input = History::new(Float, 3, 1);
    let mut output = History::new(Float, 2, 1);
    let mut evaluator = Evaluator::new(&program);

    input.push(&[Scalar::Float(1.0), Scalar::Float(2.0), Scalar::Float(3.0)]);
    evaluator.evaluate(&input, &mut output).unwrap();
    assert_eq!(
        output.latest().unwrap(),
        &[Scalar::Float(1.0), Scalar::Float(2.0)]
    );
}

#[test]
fn vector_literal_concatenates_slices_and_constants() {
    let program = compile("y = [x[0:1], 3]", Float, Float, 2, 3).unwrap();
    let mut input = History::new(Float, 2, 1);
    let mut output = History::new(Float, 3, 1);
    let mut evaluator = Evaluator::new(&program);

    input.push(&[Scalar::Float(10.0), Scalar::Float(20.0)]);
    evaluator.evaluate(&input, &mut output).unwrap();
    assert_eq!(
        output.latest().unwrap(),
        &[Scalar::Float(10.0), Scalar::Float(20.0), Scalar::Float(3.0)]
    );
}

#[test]
fn constants_broadcast_across_vectors() {
    let program = compile("y = x + 1", Float, Float, 2, 2).unwrap();
    let mut input = History::new(Float, 2, 1);
    let mut output = History::new(Float, 2, 1);
    let mut evaluator = Evaluator::new(&program);

    input.push(&[Scalar::Float(1.0), Scalar::Float(2.0)]);
    evaluator.evaluate(&input, &mut output).unwrap();
    assert_eq!(
        output.latest().unwrap(),
        &[Scalar::Float(2.0), Scalar::Float(3.0)]
    );
}

#[test]
fn integer_division_and_modulo_by_zero_yield_zero() {
    let program = compile("y = x / 0", Int32, Int32, 1, 1).unwrap();
    let mut input = History::new(Int32, 1, 1);
    let mut output = History::new(Int32, 1, 1);
    let mut evaluator = Evaluator::new(&program);
    input.push(&[Scalar::Int32(7)]);
    evaluator.evaluate(&input, &mut output).unwrap();
    assert_eq!(output.latest().unwrap(), &[Scalar::Int32(0)]);

    let program = compile("y = x % 0", Int32, Int32, 1, 1).unwrap();
    let mut output = History::new(Int32, 1, 1);
    let mut evaluator = Evaluator::new(&program);
    evaluator.evaluate(&input, &mut output).unwrap();
    assert_eq!(output.latest().unwrap(), &[Scalar::Int32(0)]);
}

#[test]
fn integer_arithmetic_wraps() {
    let program = compile("y = x + 1", Int32, Int32, 1, 1).unwrap();
    let mut input = History::new(Int32, 1, 1);
    let mut output = History::new(Int32, 1, 1);
    let mut evaluator = Evaluator::new(&program);
    input.push(&[Scalar::Int32(i32::MAX)]);
    evaluator.evaluate(&input, &mut output).unwrap();
    assert_eq!(output.latest().unwrap(), &[Scalar::Int32(i32::MIN)]);
}

#[test]
fn integer_shifts() {
    let program = compile("y = x << 3", Int32, Int32, 1, 1).unwrap();
    let mut input = History::new(Int32, 1, 1);
    let mut output = History::new(Int32, 1, 1);
    let mut evaluator = Evaluator::new(&program);
    input.push(&[Scalar::Int32(5)]);
    evaluator.evaluate(&input, &mut output).unwrap();
    assert_eq!(output.latest().unwrap(), &[Scalar::Int32(40)]);
}

#[test]
fn bit_operations_on_floats_produce_no_output() {
    assert_eq!(run("y = x << 1", &[1.0]), vec![None]);
}

#[test]
fn promoted_integer_input_maps_to_double() {
    let program = compile("y = x / 2", Int32, Double, 1, 1).unwrap();
    let mut input = History::new(Int32, 1, 1);
    let mut output = History::new(Double, 1, 1);
    let mut evaluator = Evaluator::new(&program);
    input.push(&[Scalar::Int32(5)]);
    evaluator.evaluate(&input, &mut output).unwrap();
    assert_eq!(output.latest().unwrap(), &[Scalar::Double(2.5)]);
}

#[test]
fn midi_conversion_end_to_end() {
    assert_eq!(run("y = midiToHz(69)", &[0.0]), vec![Some(440.0)]);
    assert_eq!(run("y = hzToMidi(x)", &[440.0]), vec![Some(69.0)]);
}

#[test]
fn uniform_draws_fresh_values_per_evaluation() {
    let program = compile("y = uniform(1)", Float, Float, 1, 1).unwrap();
    let mut input = History::new(Float, 1, 1);
    let mut output = History::new(Float, 1, 1);
    let mut evaluator = Evaluator::with_rng(&program, SmallRng::seed_from_u64(42));

    input.push(&[Scalar::Float(0.0)]);
    evaluator.evaluate(&input, &mut output).unwrap();
    let a = output.latest().unwrap()[0].as_f32();
    evaluator.evaluate(&input, &mut output).unwrap();
    let b = output.latest().unwrap()[0].as_f32();

    assert!((0.0..1.0).contains(&a));
    assert!((0.0..1.0).contains(&b));
    assert_ne!(a, b);

    // an identically seeded evaluator replays the same sequence
    let mut replay = Evaluator::with_rng(&program, SmallRng::seed_from_u64(42));
    let mut output2 = History::new(Float, 1, 1);
    replay.evaluate(&input, &mut output2).unwrap();
    assert_eq!(output2.latest().unwrap()[0].as_f32(), a);
}

#[test]
fn contract_violations_are_reported() {
    let program = compile("y = x{-2} * 2", Float, Float, 1, 1).unwrap();
    assert_eq!(program.input_history_depth(), 3);
    let mut evaluator = Evaluator::new(&program);

    let shallow = History::new(Float, 1, 2);
    let mut output = History::new(Float, 1, 1);
    assert_eq!(
        evaluator.evaluate(&shallow, &mut output),
        Err(EvalError::HistoryTooShallow {
            side: Side::Input,
            required: 3,
            capacity: 2,
        })
    );

    let wrong_type = History::new(Int32, 1, 3);
    assert_eq!(
        evaluator.evaluate(&wrong_type, &mut output),
        Err(EvalError::TypeMismatch {
            side: Side::Input,
            expected: Float,
            found: Int32,
        })
    );

    let input = History::new(Float, 1, 3);
    let mut wide = History::new(Float, 2, 1);
    assert_eq!(
        evaluator.evaluate(&input, &mut wide),
        Err(EvalError::LengthMismatch {
            side: Side::Output,
            expected: 1,
            found: 2,
        })
    );
}
