use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum User {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Phone,
    Role,
    CreatedAt,
}

#[derive(Iden, Clone)]
pub enum Event {
    Table,
    Id,
    Title,
    Description,
    Date,
    Time,
    Venue,
    Category,
    Price,
    IsPaid,
    MaxParticipants,
    CurrentParticipants,
    RegistrationDeadline,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden, Clone)]
pub enum Registration {
    Table,
    Id,
    UserId,
    EventId,
    Status,
    PaymentRequired,
    RegistrationDate,
}

#[derive(Iden, Clone)]
pub enum Payment {
    Table,
    Id,
    RegistrationId,
    UserId,
    EventId,
    Amount,
    OrderId,
    TransactionId,
    PaymentMethod,
    Status,
    PaymentDate,
}
