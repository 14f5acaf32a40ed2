//! Sequential constraint solver.
//!
//! Opcodes are processed in order. `AssertZero` either checks a fully
//! assigned equation or solves its single linear unknown; `Range` checks a bit
//! bound; black boxes compute their outputs. The first failure is reported as
//! [`Error::Witness`] carrying the opcode index.

use tracing::debug;
use zkwit_field::Fe;

use crate::circuit::{Expression, Opcode, Program, Witness};
use crate::error::{Error, Result};

/// A complete, satisfying witness assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// One value per witness slot.
    pub values: Vec<Fe>,
    /// Values of the public witnesses (public parameters then returns).
    pub public_inputs: Vec<Fe>,
    /// Values of the return witnesses.
    pub return_values: Vec<Fe>,
}

impl Assignment {
    /// Value of `w`, if in range.
    #[must_use]
    pub fn get(&self, w: Witness) -> Option<Fe> {
        self.values.get(w.index()).copied()
    }
}

struct Partial(Vec<Option<Fe>>);

impl Partial {
    fn get(&self, w: Witness) -> Option<Fe> {
        self.0.get(w.index()).copied().flatten()
    }

    fn assign(&mut self, opcode: usize, w: Witness, v: Fe) -> Result<()> {
        let slot = self
            .0
            .get_mut(w.index())
            .ok_or_else(|| Error::witness(opcode, format!("{w} out of range")))?;
        match slot {
            Some(old) if *old != v => Err(Error::witness(
                opcode,
                format!("{w} is already {old}, cannot become {v}"),
            )),
            _ => {
                *slot = Some(v);
                Ok(())
            }
        }
    }
}

fn solve_assert_zero(opcode: usize, e: &Expression, st: &mut Partial) -> Result<()> {
    let get = |w: Witness| st.get(w);
    let mut unknown: Option<Witness> = None;
    for w in e.witnesses() {
        if get(w).is_none() {
            match unknown {
                Some(u) if u != w => {
                    return Err(Error::witness(opcode, "more than one unknown witness"))
                }
                _ => unknown = Some(w),
            }
        }
    }
    let Some(x) = unknown else {
        return match e.evaluate(&get) {
            Some(v) if v.is_zero() => Ok(()),
            Some(v) => Err(Error::witness(
                opcode,
                format!("constraint not satisfied (evaluates to {v})"),
            )),
            None => Err(Error::witness(opcode, "unassigned witness")),
        };
    };
    if e.mul_terms.iter().any(|&(_, a, b)| a == x || b == x) {
        return Err(Error::witness(opcode, format!("{x} appears in a quadratic term")));
    }
    // q·x + rest = 0
    let q: Fe = e
        .linear_combinations
        .iter()
        .filter(|(_, w)| *w == x)
        .map(|(c, _)| *c)
        .sum();
    if q.is_zero() {
        return Err(Error::witness(opcode, format!("{x} has zero coefficient")));
    }
    let rest = Expression {
        mul_terms: e.mul_terms.clone(),
        linear_combinations: e
            .linear_combinations
            .iter()
            .filter(|(_, w)| *w != x)
            .copied()
            .collect(),
        q_c: e.q_c,
    }
    .evaluate(&get)
    .ok_or_else(|| Error::witness(opcode, "unassigned witness"))?;
    st.assign(opcode, x, -rest * q.inv())
}

/// Solve `program` from the flattened parameters in `initial`.
///
/// # Errors
/// [`Error::InvalidCircuit`] if `initial` does not fit or a slot is never
/// assigned; [`Error::Witness`] if a constraint fails.
pub fn execute(program: &Program, initial: &[Fe]) -> Result<Assignment> {
    let n = program.num_witnesses as usize;
    if initial.len() > n {
        return Err(Error::InvalidCircuit(format!(
            "{} parameter fields but only {n} witnesses",
            initial.len()
        )));
    }
    let mut st = Partial(vec![None; n]);
    for (slot, v) in st.0.iter_mut().zip(initial) {
        *slot = Some(*v);
    }

    for (i, op) in program.opcodes.iter().enumerate() {
        match op {
            Opcode::AssertZero(e) => solve_assert_zero(i, e, &mut st)?,
            Opcode::Range { .. } => op
                .check(&|w: Witness| st.get(w))
                .map_err(|reason| Error::witness(i, reason))?,
            Opcode::BlackBox(bb) => {
                let digest = bb
                    .compute(&|w: Witness| st.get(w))
                    .map_err(|reason| Error::witness(i, reason))?;
                for (&w, byte) in bb.outputs().iter().zip(digest) {
                    st.assign(i, w, Fe::from(byte))?;
                }
            }
        }
    }

    let values = st
        .0
        .iter()
        .enumerate()
        .map(|(i, v)| v.ok_or_else(|| Error::InvalidCircuit(format!("witness w{i} is never assigned"))))
        .collect::<Result<Vec<Fe>>>()?;
    let pick = |ws: &[Witness]| ws.iter().map(|w| values[w.index()]).collect::<Vec<_>>();
    let public_inputs = pick(&program.public_witnesses());
    let return_values = pick(&program.return_values);
    let assignment = Assignment {
        values,
        public_inputs,
        return_values,
    };
    debug!(
        witnesses = n,
        opcodes = program.opcodes.len(),
        "constraint system solved"
    );
    Ok(assignment)
}
