use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{DebtSettledEvent, EventHandler, EventProducer, Handler, SessionUpdatedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub debt_settled_producer: Vec<EventProducer<DebtSettledEvent>>,
    pub session_updated_producer: Vec<EventProducer<SessionUpdatedEvent>>,
}

pub struct EventHandlers {
    pub on_debt_settled: Option<EventHandler<DebtSettledEvent>>,
    pub on_session_updated: Option<EventHandler<SessionUpdatedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_debt_settled = hooks.on_debt_settled.map(|f| EventHandler::new(buffer_size, f));
        let on_session_updated = hooks.on_session_updated.map(|f| EventHandler::new(buffer_size, f));
        Self { on_debt_settled, on_session_updated }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_debt_settled {
            result.debt_settled_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_session_updated {
            result.session_updated_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_debt_settled {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_session_updated {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_debt_settled: Option<Handler<DebtSettledEvent>>,
    pub on_session_updated: Option<Handler<SessionUpdatedEvent>>,
}

impl EventHooks {
    pub fn on_debt_settled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DebtSettledEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_debt_settled = Some(Arc::new(f));
        self
    }

    pub fn on_session_updated<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(SessionUpdatedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_session_updated = Some(Arc::new(f));
        self
    }
}
