//! Explicit state machine for the booking wizard.
//!
//! The original front end held wizard selections as module-level mutable
//! variables scattered across screens. Here the flow is a single value:
//! named steps, explicit transition payloads, and selections that survive
//! backward navigation (a pending package created during payment is a
//! server-side fact; going back does not undo it).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::program::Program;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    ProgramSelect,
    PackageChoice,
    PromoCode,
    EmailCollect,
    Payment,
    Calendar,
    TimeSelect,
    BookingForm,
    Confirmation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageChoice {
    Package { lessons: i32, price_cents: i32 },
    SingleLesson,
}

/// Everything the wizard has collected so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selections {
    pub program: Option<Program>,
    pub package: Option<PackageChoice>,
    pub promo_code: Option<String>,
    pub customer_email: Option<String>,
    pub package_code: Option<String>,
    pub time_slot_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("transition not valid from step {0:?}")]
    InvalidTransition(Step),
}

#[derive(Debug, Clone)]
pub struct Wizard {
    step: Step,
    selections: Selections,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: Step::ProgramSelect,
            selections: Selections::default(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    fn expect(&self, step: Step) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition(self.step))
        }
    }

    pub fn select_program(&mut self, program: Program) -> Result<(), WizardError> {
        self.expect(Step::ProgramSelect)?;
        self.selections.program = Some(program);
        self.step = Step::PackageChoice;
        Ok(())
    }

    pub fn choose_package(&mut self, choice: PackageChoice) -> Result<(), WizardError> {
        self.expect(Step::PackageChoice)?;
        self.selections.package = Some(choice);
        self.step = Step::PromoCode;
        Ok(())
    }

    pub fn apply_promo(&mut self, promo_code: Option<String>) -> Result<(), WizardError> {
        self.expect(Step::PromoCode)?;
        self.selections.promo_code = promo_code;
        self.step = Step::EmailCollect;
        Ok(())
    }

    pub fn provide_email(&mut self, email: Option<String>) -> Result<(), WizardError> {
        self.expect(Step::EmailCollect)?;
        self.selections.customer_email = email;
        self.step = Step::Payment;
        Ok(())
    }

    /// Payment screen finished; the issued package code is now a server-side
    /// fact and is kept through any later navigation.
    pub fn payment_completed(&mut self, package_code: String) -> Result<(), WizardError> {
        self.expect(Step::Payment)?;
        self.selections.package_code = Some(package_code);
        self.step = Step::Calendar;
        Ok(())
    }

    pub fn open_day(&mut self) -> Result<(), WizardError> {
        self.expect(Step::Calendar)?;
        self.step = Step::TimeSelect;
        Ok(())
    }

    pub fn select_slot(&mut self, time_slot_id: Uuid) -> Result<(), WizardError> {
        self.expect(Step::TimeSelect)?;
        self.selections.time_slot_id = Some(time_slot_id);
        self.step = Step::BookingForm;
        Ok(())
    }

    pub fn booking_confirmed(&mut self, booking_id: Uuid) -> Result<(), WizardError> {
        self.expect(Step::BookingForm)?;
        self.selections.booking_id = Some(booking_id);
        self.step = Step::Confirmation;
        Ok(())
    }

    /// Step backward without clearing selections; already-submitted side
    /// effects (a pending package, a booking) are not undone by navigation.
    pub fn back(&mut self) {
        self.step = match self.step {
            Step::ProgramSelect => Step::ProgramSelect,
            Step::PackageChoice => Step::ProgramSelect,
            Step::PromoCode => Step::PackageChoice,
            Step::EmailCollect => Step::PromoCode,
            Step::Payment => Step::EmailCollect,
            Step::Calendar => Step::Payment,
            Step::TimeSelect => Step::Calendar,
            Step::BookingForm => Step::TimeSelect,
            // Confirmation is terminal.
            Step::Confirmation => Step::Confirmation,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_walks_every_step() {
        let mut w = Wizard::new();
        w.select_program(Program::Splashlet).unwrap();
        w.choose_package(PackageChoice::Package { lessons: 6, price_cents: 22200 }).unwrap();
        w.apply_promo(None).unwrap();
        w.provide_email(Some("parent@example.com".to_string())).unwrap();
        w.payment_completed("SPL-6L-123456-ABC".to_string()).unwrap();
        w.open_day().unwrap();
        let slot = Uuid::new_v4();
        w.select_slot(slot).unwrap();
        let booking = Uuid::new_v4();
        w.booking_confirmed(booking).unwrap();

        assert_eq!(w.step(), Step::Confirmation);
        assert_eq!(w.selections().time_slot_id, Some(slot));
        assert_eq!(w.selections().booking_id, Some(booking));
    }

    #[test]
    fn out_of_order_transition_is_rejected() {
        let mut w = Wizard::new();
        let err = w.payment_completed("X".to_string()).unwrap_err();
        assert_eq!(err, WizardError::InvalidTransition(Step::ProgramSelect));
    }

    #[test]
    fn back_keeps_submitted_side_effects() {
        let mut w = Wizard::new();
        w.select_program(Program::Droplet).unwrap();
        w.choose_package(PackageChoice::SingleLesson).unwrap();
        w.apply_promo(None).unwrap();
        w.provide_email(None).unwrap();
        w.payment_completed("DRO-1L-123456-XYZ".to_string()).unwrap();

        // Navigate all the way back to program selection.
        for _ in 0..8 {
            w.back();
        }
        assert_eq!(w.step(), Step::ProgramSelect);
        // The pending package issued during payment survives.
        assert_eq!(
            w.selections().package_code.as_deref(),
            Some("DRO-1L-123456-XYZ")
        );
    }

    #[test]
    fn confirmation_is_terminal() {
        let mut w = Wizard::new();
        w.select_program(Program::Strokelet).unwrap();
        w.choose_package(PackageChoice::SingleLesson).unwrap();
        w.apply_promo(Some("SWIMFREE".to_string())).unwrap();
        w.provide_email(None).unwrap();
        w.payment_completed("FREE-1-ABCDE".to_string()).unwrap();
        w.open_day().unwrap();
        w.select_slot(Uuid::new_v4()).unwrap();
        w.booking_confirmed(Uuid::new_v4()).unwrap();

        w.back();
        assert_eq!(w.step(), Step::Confirmation);
    }
}
