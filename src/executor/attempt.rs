//! One runtime invocation of an event against one entity.

use super::error::TransitionError;
use crate::core::{
    Errors, Machine, Metadata, Next, StateName, Stateful, TransitionDefinition, TransitionRecord,
};
use crate::persistence::{Repository, Transaction};
use tracing::{debug, debug_span, info, warn};

/// What a successful attempt did.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The state changed and this record was written.
    Transitioned(TransitionRecord),

    /// An around callback did not continue; nothing changed.
    Intercepted,
}

impl Outcome {
    pub fn is_transitioned(&self) -> bool {
        matches!(self, Outcome::Transitioned(_))
    }

    pub fn record(&self) -> Option<&TransitionRecord> {
        match self {
            Outcome::Transitioned(record) => Some(record),
            Outcome::Intercepted => None,
        }
    }
}

/// A single transition attempt.
///
/// Captures the source state when created and runs the phases in order:
/// guards, validations, then the transactional mutation. Each phase is a
/// hard failure boundary.
pub struct TransitionAttempt<'a, E> {
    machine: &'a Machine<E>,
    definition: &'a TransitionDefinition<E>,
    entity: &'a mut E,
    metadata: Metadata,
    from: StateName,
}

impl<'a, E: Stateful> TransitionAttempt<'a, E> {
    /// Resolve `event` for the entity's current state.
    ///
    /// Fails with [`TransitionError::InvalidTransition`] when the event is
    /// unknown or not legal from the current state.
    pub fn new(
        machine: &'a Machine<E>,
        entity: &'a mut E,
        event: &str,
        metadata: Metadata,
    ) -> Result<Self, TransitionError> {
        let from = entity.current_state().clone();
        let definition = machine
            .transition(event)
            .filter(|definition| definition.allows_from(&from))
            .ok_or_else(|| TransitionError::InvalidTransition {
                event: event.to_string(),
                from: from.clone(),
            })?;

        Ok(Self {
            machine,
            definition,
            entity,
            metadata,
            from,
        })
    }

    /// State the entity was in when the attempt was created.
    pub fn from_state(&self) -> &StateName {
        &self.from
    }

    pub fn definition(&self) -> &TransitionDefinition<E> {
        self.definition
    }

    /// Evaluate guards in declaration order, stopping at the first failure.
    pub fn check_guards(&self) -> Result<(), TransitionError> {
        let definition = self.definition;
        for guard in definition.guards() {
            if !guard.evaluate(&*self.entity)? {
                return Err(TransitionError::CheckFailed {
                    event: definition.event().to_string(),
                    guard: guard.describe(),
                });
            }
        }
        Ok(())
    }

    /// Run every validation against a cleared error slate.
    ///
    /// Accumulated errors are left on the entity and returned in
    /// [`TransitionError::ValidationFailed`].
    pub fn validate(&mut self) -> Result<(), TransitionError> {
        let definition = self.definition;
        if definition.validations().is_empty() {
            return Ok(());
        }

        self.entity.errors_mut().clear();
        let mut errors = Errors::default();
        for validation in definition.validations() {
            validation.run(&*self.entity, &mut errors);
        }
        *self.entity.errors_mut() = errors.clone();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TransitionError::ValidationFailed {
                event: definition.event().to_string(),
                errors,
            })
        }
    }

    /// Execute every phase.
    pub fn run<R>(mut self, repository: &R) -> Result<Outcome, TransitionError>
    where
        R: Repository<E> + ?Sized,
    {
        let span = debug_span!(
            "transition",
            subject = E::subject_type(),
            id = %self.entity.subject_id(),
            event = %self.definition.event(),
        );
        let _entered = span.enter();

        self.check_guards()?;
        debug!("guards passed");
        self.validate()?;
        debug!("validations passed");
        self.apply(repository)
    }

    /// Transactional mutation phase.
    ///
    /// A failure inside the mutation step rolls the transaction back even
    /// when an around callback discards it.
    fn apply<R>(self, repository: &R) -> Result<Outcome, TransitionError>
    where
        R: Repository<E> + ?Sized,
    {
        let TransitionAttempt {
            machine,
            definition,
            entity,
            mut metadata,
            from,
        } = self;
        let version = entity.lock_version();
        let mut tx = repository.begin()?;
        let mut written: Option<TransitionRecord> = None;
        let mut failure: Option<TransitionError> = None;

        let chained = {
            let mut step = |entity: &mut E| -> Result<(), TransitionError> {
                let metadata = std::mem::take(&mut metadata);
                match mutate(machine, definition, &mut *tx, entity, &from, metadata) {
                    Ok(record) => {
                        written = Some(record);
                        Ok(())
                    }
                    Err(err) => {
                        failure = Some(err.clone());
                        Err(err)
                    }
                }
            };
            Next::new(definition.around(), &mut step).run(entity)
        };

        let result = match (failure, chained) {
            (Some(err), _) | (None, Err(err)) => {
                tx.rollback();
                Err(err)
            }
            (None, Ok(())) => tx.commit().map_err(TransitionError::from),
        };

        if let Err(err) = result {
            restore(entity, from, version);
            warn!(error = %err, "transition rolled back");
            return Err(err);
        }

        match written {
            Some(record) => {
                info!(from = %record.from, to = %record.to, "transition completed");
                Ok(Outcome::Transitioned(record))
            }
            None => {
                restore(entity, from, version);
                debug!("transition intercepted by around callback");
                Ok(Outcome::Intercepted)
            }
        }
    }
}

/// Innermost step of the around chain: before callbacks, state change,
/// save, history append, after callbacks.
fn mutate<E: Stateful>(
    machine: &Machine<E>,
    definition: &TransitionDefinition<E>,
    tx: &mut (dyn Transaction<E> + '_),
    entity: &mut E,
    from: &StateName,
    metadata: Metadata,
) -> Result<TransitionRecord, TransitionError> {
    for callback in definition.before() {
        callback.run(entity)?;
    }
    entity.set_current_state(definition.destination().clone());
    tx.save(entity)?;

    let record = TransitionRecord::new(
        E::subject_type(),
        entity.subject_id(),
        definition.event(),
        from.clone(),
        definition.destination().clone(),
        metadata,
    );
    tx.record(machine.history_table(), record.clone())?;

    for callback in definition.after() {
        callback.run(entity)?;
    }
    Ok(record)
}

fn restore<E: Stateful>(entity: &mut E, from: StateName, version: Option<u64>) {
    entity.set_current_state(from);
    if let Some(version) = version {
        entity.set_lock_version(version);
    }
}
