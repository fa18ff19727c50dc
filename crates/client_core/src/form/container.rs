use shared::protocol::{FieldErrors, Payload};

use super::FormOrchestrator;

pub struct FormProps<'a> {
    pub values: &'a Payload,
    pub errors: &'a FieldErrors,
    pub handlers: &'a FormOrchestrator,
}

pub trait FormView {
    type Output;

    fn render(&self, props: FormProps<'_>) -> Self::Output;
}

pub struct FormContainer<V> {
    view: V,
    orchestrator: FormOrchestrator,
}

impl<V: FormView> FormContainer<V> {
    pub fn new(view: V, orchestrator: FormOrchestrator) -> Self {
        Self { view, orchestrator }
    }

    pub fn orchestrator(&self) -> &FormOrchestrator {
        &self.orchestrator
    }

    pub fn render(&self) -> V::Output {
        let state = self.orchestrator.snapshot();
        self.view.render(FormProps {
            values: state.values(),
            errors: state.errors(),
            handlers: &self.orchestrator,
        })
    }

    pub fn unmount(self) -> V {
        self.orchestrator.unmount();
        self.view
    }
}
