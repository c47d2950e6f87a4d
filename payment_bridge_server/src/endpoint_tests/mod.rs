mod helpers;
mod mocks;
mod order_created;
mod payment_status;
