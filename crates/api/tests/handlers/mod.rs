mod appointments_test;
mod clients_test;
